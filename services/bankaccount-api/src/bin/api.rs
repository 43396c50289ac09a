/// REST API Lambdaエントリポイント
///
/// API Gateway経由のHTTPリクエストをaxumルーターで処理する。
/// Neptuneクライアントはコールドスタート時に1度だけ構築し、全リクエストで共有する。
use std::sync::Arc;

use bankaccount_api::api::create_router;
use bankaccount_api::infrastructure::{NeptuneConfig, NeptuneGraphStore, init_logging};
use lambda_http::{Error, run};
use tracing::{error, info};

/// 環境変数からNeptuneクライアントを構築する
///
/// 設定が欠けている場合はコールドスタートを失敗させる。
fn init_store() -> Result<Arc<NeptuneGraphStore>, Error> {
    let config = NeptuneConfig::from_env().inspect_err(|e| {
        error!(error = %e, "Neptune設定の読み込みに失敗");
    })?;
    Ok(Arc::new(NeptuneGraphStore::connect(&config)?))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("REST API Lambda関数を初期化");

    let store = init_store()?;
    let app = create_router(Arc::clone(&store));

    let result = run(app).await;

    // ランタイムが停止した場合のみ到達する
    if let Ok(store) = Arc::try_unwrap(store) {
        store.close();
    }
    result
}
