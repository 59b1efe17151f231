use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    state::AppState,
    users::{
        dto::PublicUser,
        error::UserError,
        repo::StoreError,
        schema::{UserCandidate, ValidationError},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user).put(update_user))
}

fn reject(e: UserError) -> (StatusCode, String) {
    let status = match &e {
        UserError::Validation(ValidationError::DuplicateValue(_)) => StatusCode::CONFLICT,
        UserError::Validation(_) => StatusCode::BAD_REQUEST,
        UserError::NotFound(_) => StatusCode::NOT_FOUND,
        UserError::Store(StoreError::IdTaken(_)) => StatusCode::CONFLICT,
        UserError::Store(_) | UserError::Password(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCandidate>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    let user = services::register(state.store.as_ref(), payload)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = services::get(state.store.as_ref(), &id)
        .await
        .map_err(reject)?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UserCandidate>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = services::update(state.store.as_ref(), &id, payload)
        .await
        .map_err(reject)?;
    Ok(Json(user.into()))
}
