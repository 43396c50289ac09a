/// ログ基盤モジュール
///
/// Lambda(CloudWatch)向けのJSON構造化ログと、テスト向けの簡易ログを提供する。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログサブスクライバー初期化用の同期プリミティブ
static INIT: Once = Once::new();

/// ログサブスクライバーを初期化する
///
/// `RUST_LOG`が設定されていればそれに従い、なければinfoレベルで出力する。
/// 複数回呼び出しても最初の1回のみ初期化される。
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // CloudWatch Logs Insightsで検索しやすいよう、フィールドをトップレベルに展開する
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
            // グラフ操作の#[instrument]スパン（label, id等）を各行に付与する
            .with_current_span(true)
            .with_span_list(false);

        // 他のサブスクライバーが既に登録されている場合（テストなど）はそちらに出力を任せる
        if let Err(e) = tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
        {
            tracing::warn!(error = %e, "ログサブスクライバーは登録済みのためJSONログを設定しない");
        }
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        if let Err(e) = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
        {
            tracing::debug!(error = %e, "テスト用ログサブスクライバーは登録済み");
        }
    });
}
