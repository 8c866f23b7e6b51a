//! Class-session routes
//!
//! Scheduling rules live in [`scheduling::ClassSessionService`]; handlers
//! only translate requests and errors.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;
use scheduling::model::{NewClassSession, SessionFilter};
use uuid::Uuid;

use super::{created, no_content};
use crate::{
    AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        DeletedCount, Pagination,
        class_session::{
            ClassSessionQuery, ConflictQuery, CreateClassSessionRequest, UpcomingQuery,
            UpdateClassSessionRequest,
        },
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/upcoming", get(upcoming_sessions))
        .route("/conflicts", get(check_conflict))
        .route("/course/:course_id", delete(delete_course_sessions))
        .route("/instructor/:instructor_id", delete(delete_instructor_sessions))
        .route(
            "/:id",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/:id/cancel", post(cancel_session))
        .route("/:id/activate", post(activate_session))
}

/// List sessions ordered by start time
pub async fn list_sessions(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiQuery(query): ApiQuery<ClassSessionQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = SessionFilter::from(query);
    let sessions = state.sessions.list(&filter, pagination.page()).await?;

    Ok(Json(sessions))
}

pub async fn upcoming_sessions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UpcomingQuery>,
) -> ApiResult<impl IntoResponse> {
    let sessions = state
        .sessions
        .upcoming(Utc::now(), query.hours_ahead)
        .await?;

    Ok(Json(sessions))
}

/// Report whether a proposed slot overlaps an active session, without
/// writing anything
pub async fn check_conflict(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ConflictQuery>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .sessions
        .check_conflict(
            query.instructor_id,
            query.start_at,
            query.duration_minutes,
            query.exclude_session_id,
        )
        .await?;

    Ok(Json(result))
}

pub async fn get_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.sessions.get(id).await?))
}

/// Schedule a class session
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateClassSessionRequest>,
) -> ApiResult<Response> {
    let session = state
        .sessions
        .create(NewClassSession::from(payload))
        .await?;

    Ok(created(session))
}

pub async fn update_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateClassSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.sessions.update(id, payload.into()).await?;

    Ok(Json(session))
}

pub async fn cancel_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.sessions.cancel(id).await?))
}

pub async fn activate_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.sessions.activate(id).await?))
}

pub async fn delete_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    state.sessions.delete(id).await?;
    Ok(no_content())
}

pub async fn delete_course_sessions(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.sessions.delete_for_course(course_id).await?;
    Ok(Json(DeletedCount { deleted }))
}

pub async fn delete_instructor_sessions(
    State(state): State<AppState>,
    ApiPath(instructor_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.sessions.delete_for_instructor(instructor_id).await?;
    Ok(Json(DeletedCount { deleted }))
}
