//! 銀行口座エンドポイント
//!
//! - POST /bank-accounts
//! - GET /bank-accounts
//! - GET /bank-accounts/{iban}
//! - PATCH /bank-accounts/{iban}
//! - DELETE /bank-accounts/{iban}

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
use crate::domain::{BankAccount, CreateBankAccount, UpdateBankAccount};
use crate::infrastructure::GraphStore;

pub fn routes<G>() -> Router<AppState<G>>
where
    G: GraphStore + 'static,
{
    Router::new()
        .route("/bank-accounts", post(create::<G>).get(find_all::<G>))
        .route(
            "/bank-accounts/{iban}",
            get(find_one::<G>).patch(update::<G>).delete(remove::<G>),
        )
}

async fn create<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    payload: Result<Json<CreateBankAccount>, JsonRejection>,
) -> Result<(StatusCode, Json<BankAccount>), ApiError> {
    let payload = json_body(payload)?;
    info!(iban = %payload.iban, person_id = %payload.person_id, "銀行口座作成リクエストを受信");
    let account = state.bank_accounts.create(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn find_all<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
) -> Result<Json<Vec<BankAccount>>, ApiError> {
    Ok(Json(state.bank_accounts.find_all().await?))
}

async fn find_one<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(iban): Path<String>,
) -> Result<Json<BankAccount>, ApiError> {
    Ok(Json(state.bank_accounts.find_one(&iban).await?))
}

async fn update<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(iban): Path<String>,
    payload: Result<Json<UpdateBankAccount>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let payload = json_body(payload)?;
    info!(iban = %iban, "銀行口座更新リクエストを受信");
    Ok(Json(state.bank_accounts.update(&iban, payload).await?))
}

async fn remove<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(iban): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    info!(iban = %iban, "銀行口座削除リクエストを受信");
    Ok(Json(state.bank_accounts.remove(&iban).await?))
}
