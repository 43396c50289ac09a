//! 友人関係エンドポイント
//!
//! - POST /friendships
//! - GET /friendships
//! - GET /friendships/{person1Id}/{person2Id}
//! - DELETE /friendships/{person1Id}/{person2Id}

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use tracing::info;

use super::error::{ApiError, json_body};
use super::router::AppState;
use crate::application::DeleteEdgeResponse;
use crate::domain::{CreateFriendship, Friendship};
use crate::infrastructure::{Edge, GraphStore};

pub fn routes<G>() -> Router<AppState<G>>
where
    G: GraphStore + 'static,
{
    Router::new()
        .route("/friendships", post(create::<G>).get(find_all::<G>))
        .route(
            "/friendships/{person1_id}/{person2_id}",
            get(find_one::<G>).delete(remove::<G>),
        )
}

async fn create<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    payload: Result<Json<CreateFriendship>, JsonRejection>,
) -> Result<(StatusCode, Json<Edge>), ApiError> {
    let payload = json_body(payload)?;
    info!(
        person1_id = %payload.person1_id,
        person2_id = %payload.person2_id,
        "友人関係作成リクエストを受信"
    );
    let edge = state.friendships.create(payload).await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

async fn find_all<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
) -> Result<Json<Vec<Friendship>>, ApiError> {
    Ok(Json(state.friendships.find_all().await?))
}

async fn find_one<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path((person1_id, person2_id)): Path<(String, String)>,
) -> Result<Json<Friendship>, ApiError> {
    Ok(Json(state.friendships.find_one(&person1_id, &person2_id).await?))
}

async fn remove<G: GraphStore + 'static>(
    State(state): State<AppState<G>>,
    Path((person1_id, person2_id)): Path<(String, String)>,
) -> Result<Json<DeleteEdgeResponse>, ApiError> {
    info!(person1_id = %person1_id, person2_id = %person2_id, "友人関係削除リクエストを受信");
    Ok(Json(state.friendships.remove(&person1_id, &person2_id).await?))
}
