//! 人物エンドポイント
//!
//! - POST /persons
//! - GET /persons
//! - GET /persons/{id}
//! - PATCH /persons/{id}
//! - DELETE /persons/{id}

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
use crate::domain::{CreatePerson, Person, UpdatePerson};
use crate::infrastructure::GraphStore;

pub fn routes<G>() -> Router<AppState<G>>
where
    G: GraphStore + 'static,
{
    Router::new()
        .route("/persons", post(create::<G>).get(find_all::<G>))
        .route(
            "/persons/{id}",
            get(find_one::<G>).patch(update::<G>).delete(remove::<G>),
        )
}

async fn create<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    payload: Result<Json<CreatePerson>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let payload = json_body(payload)?;
    info!("人物作成リクエストを受信");
    let person = state.persons.create(payload).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

async fn find_all<G: GraphStore + 'static>(State(state): State<AppState<G>>) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(state.persons.find_all().await?))
}

async fn find_one<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    Ok(Json(state.persons.find_one(&id).await?))
}

async fn update<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePerson>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let payload = json_body(payload)?;
    info!(person_id = %id, "人物更新リクエストを受信");
    Ok(Json(state.persons.update(&id, payload).await?))
}

async fn remove<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    info!(person_id = %id, "人物削除リクエストを受信");
    Ok(Json(state.persons.remove(&id).await?))
}
