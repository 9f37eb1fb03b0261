//! API service routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use common::User;
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::UpdateUserRequest,
    service::ServiceError,
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health-check", get(health_check))
        .route("/api/v1/users", get(get_users).post(create_user))
        .route(
            "/api/v1/users/",
            get(missing_id).put(missing_id).delete(missing_id),
        )
        .route(
            "/api/v1/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state)
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    if raw.is_empty() {
        return Err(ApiError::BadRequest("id is required".to_string()));
    }

    Uuid::parse_str(raw).map_err(|_| {
        warn!("Rejected malformed user id {:?}", raw);
        ApiError::BadRequest("wrong id, must be uuid".to_string())
    })
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })
}

/// Liveness endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Routes whose `{id}` segment is empty
pub async fn missing_id() -> ApiError {
    ApiError::BadRequest("id is required".to_string())
}

/// Get all users
///
/// An empty collection is not an error: a `NotFound` from the service renders
/// as an empty list.
pub async fn get_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let ctx = state.request_context();

    match state.user_service.get_users(&ctx).await {
        Ok(users) => Ok(Json(users)),
        Err(ServiceError::NotFound { .. }) => Ok(Json(Vec::new())),
        Err(e) => Err(e.into()),
    }
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id)?;
    let ctx = state.request_context();

    let user = state.user_service.get_user_by_id(&ctx, id).await?;
    Ok(Json(user))
}

/// Create a new user under its caller-supplied identifier
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<User>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let user = json_body(payload)?;
    let ctx = state.request_context();

    let user = state.user_service.insert_user(&ctx, user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace login and password of a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id)?;
    let user = json_body(payload)?
        .into_user(id)
        .ok_or_else(|| ApiError::BadRequest("id in body does not match path".to_string()))?;
    let ctx = state.request_context();

    let user = state.user_service.update_user(&ctx, id, user).await?;
    Ok(Json(user))
}

/// Delete a user, returning the deleted snapshot
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id)?;
    let ctx = state.request_context();

    let user = state.user_service.delete_user(&ctx, id).await?;
    Ok(Json(user))
}
