//! Device registration and push-notification routes

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use uuid::Uuid;

use super::{created, no_content};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        Pagination,
        notification::{PushMessage, RegisterTokenRequest, SendToRoleRequest, SendToUserRequest},
    },
    validation::validate_required,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tokens", post(register_token))
        .route("/tokens/:token", delete(deactivate_token))
        .route("/tokens/user/:user_id", get(tokens_for_user))
        .route("/send/user", post(send_to_user))
        .route("/send/role", post(send_to_role))
        .route("/logs/:user_id", get(logs_for_user))
}

const MAX_PUSH_TITLE_LEN: usize = 200;

fn validate_message(message: &PushMessage) -> ApiResult<()> {
    validate_required("Title", &message.title, MAX_PUSH_TITLE_LEN).map_err(ApiError::Validation)?;
    validate_required("Body", &message.body, usize::MAX).map_err(ApiError::Validation)
}

/// Register a device token, re-activating it if already known
pub async fn register_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterTokenRequest>,
) -> ApiResult<Response> {
    let token = state
        .notifications
        .register_token(
            payload.user_id,
            payload.token.trim(),
            payload.device_info.as_deref(),
        )
        .await?;

    Ok(created(token))
}

pub async fn deactivate_token(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
) -> ApiResult<Response> {
    state.notifications.deactivate_token(&token).await?;
    Ok(no_content())
}

pub async fn tokens_for_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.notifications.tokens_for_user(user_id).await?))
}

pub async fn send_to_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendToUserRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_message(&payload.message)?;

    let report = state
        .notifications
        .send_to_user(payload.user_id, &payload.message)
        .await?;

    Ok(Json(report))
}

pub async fn send_to_role(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendToRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_message(&payload.message)?;

    let report = state
        .notifications
        .send_to_role(payload.role, &payload.message)
        .await?;

    Ok(Json(report))
}

/// Delivery history of a user, most recent first
pub async fn logs_for_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let logs = state
        .notifications
        .logs_for_user(user_id, pagination.page())
        .await?;

    Ok(Json(logs))
}
