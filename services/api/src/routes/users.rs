//! User registry routes

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use uuid::Uuid;

use super::{created, no_content};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        Pagination,
        user::{CreateUserRequest, UserQuery},
    },
    repositories::user::EMAIL_CONSTRAINT,
    validation::validate_email,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/by-email/:email", get(get_user_by_email))
        .route("/:id", get(get_user).delete(delete_user))
}

/// Register a user
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<Response> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;

    let user = state
        .user_repository
        .create(&payload)
        .await
        .map_err(ApiError::on_unique(EMAIL_CONSTRAINT, "Email already registered"))?;

    Ok(created(user))
}

/// List users, optionally by role
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    let users = state
        .user_repository
        .list(query.role, pagination.page())
        .await?;

    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;

    Ok(Json(user))
}

pub async fn get_user_by_email(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user with email {} not found", email)))?;

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    if !state.user_repository.delete(id).await? {
        return Err(ApiError::not_found("user", id));
    }
    tracing::info!(user_id = %id, "User deleted");
    Ok(no_content())
}
