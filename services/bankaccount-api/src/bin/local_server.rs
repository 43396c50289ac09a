/// ローカル開発用HTTPサーバー
///
/// Lambdaと同じルーターをaxum::serveで起動する。
/// ローカルのGremlin Serverに接続する場合は`NEPTUNE_ENDPOINT_SCHEME=http`を指定する。
///
/// SIGTERMまたはCtrl+Cを受信するとgraceful shutdownを実行し、
/// 処理中のリクエスト完了を待ってからNeptuneクライアントを解放する。
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bankaccount_api::api::create_router;
use bankaccount_api::infrastructure::{NeptuneConfig, NeptuneGraphStore, init_logging};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "local-server")]
#[command(about = "銀行口座REST APIをローカルで起動")]
struct CliArgs {
    /// バインドするアドレス
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// リッスンするポート
    #[arg(long, short = 'p', default_value_t = 3000)]
    port: u16,
}

/// シャットダウンシグナルを待機する
///
/// ハンドラーの登録に失敗したシグナルは待機対象から外す。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C シグナルハンドラーの登録に失敗");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM シグナルハンドラーの登録に失敗");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C (SIGINT) を受信しました。graceful shutdownを開始します");
        }
        _ = terminate => {
            info!("SIGTERM を受信しました。graceful shutdownを開始します");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging();

    let args = CliArgs::parse();

    let config = NeptuneConfig::from_env().inspect_err(|e| {
        error!(error = %e, "Neptune設定の読み込みに失敗");
    })?;
    let store = Arc::new(NeptuneGraphStore::connect(&config)?);
    let app = create_router(Arc::clone(&store));

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "リッスン開始");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // サーバー終了後はルーターが保持していた参照も解放されている
    if let Ok(store) = Arc::try_unwrap(store) {
        store.close();
    }
    info!("サーバーが正常に停止しました");
    Ok(())
}
