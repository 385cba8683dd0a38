//! User endpoints
//!
//! Paths keep the original service's verb-style names.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidUserId};
use crate::http::server::AppState;
use crate::models::{User, UserCandidate};

/// GET /users/getAllUsers - every user, id ascending
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list_all().await?;
    Ok(Json(users))
}

/// POST /users/addUser - create a user from `{name, email}`
async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(candidate): JsonBody<UserCandidate>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.create(candidate).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// DELETE /users/deleteUser/{id}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    ValidUserId(id): ValidUserId,
) -> Result<StatusCode, ApiError> {
    state.users.remove(id.get()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/getAllUsers", get(list_users))
        .route("/users/addUser", post(create_user))
        .route("/users/deleteUser/{id}", delete(delete_user))
}

