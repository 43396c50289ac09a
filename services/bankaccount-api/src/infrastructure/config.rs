/// Neptune接続設定
///
/// Gremlin HTTPエンドポイントの所在を環境変数から読み込む。
/// ホスト名とポートは必須で、欠落している場合は起動時に失敗させる。
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Neptuneクラスタのホスト名
pub const HOSTNAME_ENV: &str = "NEPTUNE_ENDPOINT_HOSTNAME";

/// Neptuneクラスタのポート
pub const PORT_ENV: &str = "NEPTUNE_ENDPOINT_PORT";

/// 接続スキーム（省略時はhttps）
pub const SCHEME_ENV: &str = "NEPTUNE_ENDPOINT_SCHEME";

/// リクエストタイムアウト秒数（省略時は30秒）
pub const REQUEST_TIMEOUT_ENV: &str = "NEPTUNE_REQUEST_TIMEOUT_SECS";

/// デフォルトのリクエストタイムアウト（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// デフォルトの接続スキーム
const DEFAULT_SCHEME: &str = "https";

/// Neptune設定のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NeptuneConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Invalid Gremlin endpoint URL: {0}")]
    InvalidUrl(String),
}

/// Gremlinエンドポイントへの接続設定
#[derive(Debug, Clone, PartialEq)]
pub struct NeptuneConfig {
    hostname: String,
    port: u16,
    scheme: String,
    request_timeout: Duration,
}

impl NeptuneConfig {
    /// 明示的な値で設定を作成（https、タイムアウト30秒）
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            scheme: DEFAULT_SCHEME.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// 接続スキームを差し替える（ローカルのGremlin Server向けにhttpを使う場合など）
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 環境変数から設定を読み込む
    ///
    /// # 環境変数
    /// - `NEPTUNE_ENDPOINT_HOSTNAME`: ホスト名（必須）
    /// - `NEPTUNE_ENDPOINT_PORT`: ポート番号（必須）
    /// - `NEPTUNE_ENDPOINT_SCHEME`: `https`または`http`（任意）
    /// - `NEPTUNE_REQUEST_TIMEOUT_SECS`: リクエストタイムアウト秒数（任意）
    pub fn from_env() -> Result<Self, NeptuneConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    fn from_lookup<F>(lookup: F) -> Result<Self, NeptuneConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| NeptuneConfigError::MissingEnvVar(name.to_string()))
        };
        let invalid = |name: &str, value: &str| NeptuneConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: value.to_string(),
        };

        let hostname = required(HOSTNAME_ENV)?;

        let port_raw = required(PORT_ENV)?;
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| invalid(PORT_ENV, &port_raw))?;

        let mut config = Self::new(hostname.trim(), port);

        if let Some(scheme) = lookup(SCHEME_ENV).filter(|s| !s.trim().is_empty()) {
            let scheme = scheme.trim().to_ascii_lowercase();
            if scheme != "https" && scheme != "http" {
                return Err(invalid(SCHEME_ENV, &scheme));
            }
            config = config.with_scheme(scheme);
        }

        if let Some(timeout_raw) = lookup(REQUEST_TIMEOUT_ENV).filter(|s| !s.trim().is_empty()) {
            let secs = timeout_raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid(REQUEST_TIMEOUT_ENV, &timeout_raw))?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// GremlinエンドポイントURLを構築
    ///
    /// 例: `https://db.cluster-xxx.eu-central-1.neptune.amazonaws.com:8182/gremlin`
    pub fn gremlin_url(&self) -> Result<Url, NeptuneConfigError> {
        let raw = format!("{}://{}:{}/gremlin", self.scheme, self.hostname, self.port);
        Url::parse(&raw).map_err(|e| NeptuneConfigError::InvalidUrl(format!("{raw}: {e}")))
    }
}
