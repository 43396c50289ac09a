//! 銀行取引エンドポイント
//!
//! - POST /bank-transactions
//! - GET /bank-transactions
//! - GET /bank-transactions/{id}
//! - PATCH /bank-transactions/{id}
//! - DELETE /bank-transactions/{id}

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use tracing::info;

use super::error::{ApiError, json_body};
use super::router::AppState;
use crate::application::{DeleteResponse, UpdateResponse};
use crate::domain::{BankTransaction, CreateBankTransaction, UpdateBankTransaction};
use crate::infrastructure::GraphStore;

pub fn routes<G>() -> Router<AppState<G>>
where
    G: GraphStore + 'static,
{
    Router::new()
        .route("/bank-transactions", post(create::<G>).get(find_all::<G>))
        .route(
            "/bank-transactions/{id}",
            get(find_one::<G>).patch(update::<G>).delete(remove::<G>),
        )
}

async fn create<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    payload: Result<Json<CreateBankTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<BankTransaction>), ApiError> {
    let payload = json_body(payload)?;
    info!(
        from = %payload.bank_account_iban,
        to = %payload.other_person_iban,
        amount = payload.amount,
        "取引作成リクエストを受信"
    );
    let transaction = state.bank_transactions.create(payload).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn find_all<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
) -> Result<Json<Vec<BankTransaction>>, ApiError> {
    Ok(Json(state.bank_transactions.find_all().await?))
}

async fn find_one<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<String>,
) -> Result<Json<BankTransaction>, ApiError> {
    Ok(Json(state.bank_transactions.find_one(&id).await?))
}

async fn update<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBankTransaction>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let payload = json_body(payload)?;
    info!(transaction_id = %id, "取引更新リクエストを受信");
    Ok(Json(state.bank_transactions.update(&id, payload).await?))
}

async fn remove<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    info!(transaction_id = %id, "取引削除リクエストを受信");
    Ok(Json(state.bank_transactions.remove(&id).await?))
}
