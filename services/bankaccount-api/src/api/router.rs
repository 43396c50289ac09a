//! ルーター構築
//!
//! 全エンドポイントのルーティングを定義し、トレース・CORSレイヤーを適用する。
//! Lambda（lambda_http）とローカルサーバーの両方から同じルーターを使う。

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{bank_accounts, bank_transactions, friendships, persons};
use crate::application::{BankAccountsService, BankTransactionsService, FriendshipsService, PersonsService};
use crate::infrastructure::GraphStore;

/// アプリケーション状態
///
/// 4つのサービスが同じグラフストアを共有する。
pub struct AppState<G>
where
    G: GraphStore,
{
    pub persons: PersonsService<G>,
    pub bank_accounts: BankAccountsService<G>,
    pub bank_transactions: BankTransactionsService<G>,
    pub friendships: FriendshipsService<G>,
}

impl<G: GraphStore> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            persons: self.persons.clone(),
            bank_accounts: self.bank_accounts.clone(),
            bank_transactions: self.bank_transactions.clone(),
            friendships: self.friendships.clone(),
        }
    }
}

impl<G> AppState<G>
where
    G: GraphStore,
{
    pub fn new(store: Arc<G>) -> Self {
        Self {
            persons: PersonsService::new(Arc::clone(&store)),
            bank_accounts: BankAccountsService::new(Arc::clone(&store)),
            bank_transactions: BankTransactionsService::new(Arc::clone(&store)),
            friendships: FriendshipsService::new(store),
        }
    }
}

/// ヘルスチェックエンドポイント
async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

/// ルーターを構築する
///
/// TraceLayerによりmethod, path, status, latencyを自動記録する。
/// CORSは全オリジンを許可する。
pub fn create_router<G>(store: Arc<G>) -> Router
where
    G: GraphStore + 'static,
{
    Router::new()
        .route("/health", get(health))
        .merge(persons::routes::<G>())
        .merge(bank_accounts::routes::<G>())
        .merge(bank_transactions::routes::<G>())
        .merge(friendships::routes::<G>())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(store))
}
