/// サービス層のエラー型
///
/// ドメイン上の失敗の種類をタグとして持ち、HTTP層で1か所だけステータスコードに変換される。
use thiserror::Error;

use crate::domain::ValidationError;
use crate::infrastructure::GraphStoreError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    /// 入力が不正（400）
    #[error("{0}")]
    Validation(String),

    /// 対象が存在しない（404）
    #[error("{0}")]
    NotFound(String),

    /// 一意性に反する（409）
    #[error("{0}")]
    Conflict(String),

    /// グラフストアの障害など（500）
    #[error("{0}")]
    Operational(String),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<GraphStoreError> for ServiceError {
    fn from(err: GraphStoreError) -> Self {
        ServiceError::Operational(err.to_string())
    }
}

impl ServiceError {
    /// キー指定の更新・削除で一致が0件だった場合をNotFoundに読み替える
    pub(crate) fn from_keyed_write(err: GraphStoreError, not_found: impl FnOnce() -> String) -> Self {
        if err.is_no_match() {
            ServiceError::NotFound(not_found())
        } else {
            ServiceError::from(err)
        }
    }

    /// 種類を保ったままメッセージの先頭に文脈を付ける
    pub fn with_context(self, context: &str) -> Self {
        match self {
            ServiceError::Validation(m) => ServiceError::Validation(format!("{context}: {m}")),
            ServiceError::NotFound(m) => ServiceError::NotFound(format!("{context}: {m}")),
            ServiceError::Conflict(m) => ServiceError::Conflict(format!("{context}: {m}")),
            ServiceError::Operational(m) => ServiceError::Operational(format!("{context}: {m}")),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::Validation(m)
            | ServiceError::NotFound(m)
            | ServiceError::Conflict(m)
            | ServiceError::Operational(m) => m,
        }
    }
}
