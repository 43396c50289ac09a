// アプリケーション層モジュール
pub mod bank_accounts_service;
pub mod bank_transactions_service;
pub mod friendships_service;
pub mod persons_service;
pub mod responses;
mod rollback;
pub mod service_error;

// 再エクスポート
pub use bank_accounts_service::BankAccountsService;
pub use bank_transactions_service::BankTransactionsService;
pub use friendships_service::FriendshipsService;
pub use persons_service::PersonsService;
pub use responses::{DeleteEdgeResponse, DeleteResponse, UpdateResponse};
pub use service_error::ServiceError;
