// HTTP層モジュール
pub mod bank_accounts;
pub mod bank_transactions;
pub mod error;
pub mod friendships;
pub mod persons;
pub mod router;

// 再エクスポート
pub use error::{ApiError, ApiErrorBody};
pub use router::{AppState, create_router};
