//! Course catalogue routes
//!
//! `DELETE /:id` cancels a course; `DELETE /:id/hard` removes it together
//! with its sessions and bookings.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use scheduling::model::LifecycleState;
use uuid::Uuid;

use super::{created, no_content};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        Pagination,
        course::{
            CourseQuery, CourseSearchQuery, CreateCourseRequest, PriceRangeQuery,
            UpdateCourseRequest,
        },
    },
    validation::validate_price_range,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/active", get(list_active_courses))
        .route("/search", get(search_courses))
        .route("/price-range", get(courses_by_price_range))
        .route("/package/:package_type", get(courses_by_package_type))
        .route(
            "/:id",
            get(get_course).put(update_course).delete(cancel_course),
        )
        .route("/:id/hard", delete(delete_course))
        .route("/:id/restore", post(restore_course))
}

pub async fn list_courses(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiQuery(query): ApiQuery<CourseQuery>,
) -> ApiResult<impl IntoResponse> {
    let courses = state
        .course_repository
        .list(query.state, pagination.page())
        .await?;

    Ok(Json(courses))
}

pub async fn list_active_courses(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let courses = state
        .course_repository
        .list(Some(LifecycleState::Active), pagination.page())
        .await?;

    Ok(Json(courses))
}

/// Case-insensitive title search
pub async fn search_courses(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiQuery(query): ApiQuery<CourseSearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(ApiError::Validation("Search term is required".to_string()));
    }

    let courses = state
        .course_repository
        .search(term, pagination.page())
        .await?;

    Ok(Json(courses))
}

pub async fn courses_by_price_range(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PriceRangeQuery>,
) -> ApiResult<impl IntoResponse> {
    validate_price_range(query.min_price, query.max_price).map_err(ApiError::Validation)?;

    let courses = state
        .course_repository
        .by_price_range(query.min_price, query.max_price)
        .await?;

    Ok(Json(courses))
}

pub async fn courses_by_package_type(
    State(state): State<AppState>,
    ApiPath(package_type): ApiPath<String>,
) -> ApiResult<impl IntoResponse> {
    let courses = state
        .course_repository
        .by_package_type(&package_type)
        .await?;

    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let course = state
        .course_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("course", id))?;

    Ok(Json(course))
}

/// Create a course
pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCourseRequest>,
) -> ApiResult<Response> {
    let course = payload.into_course();
    course.validate().map_err(ApiError::Validation)?;

    let course = state.course_repository.create(&course).await?;

    Ok(created(course))
}

/// Apply a partial update, re-validating the merged course
pub async fn update_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCourseRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut course = state
        .course_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("course", id))?;

    payload.apply_to(&mut course);
    course.validate().map_err(ApiError::Validation)?;

    let course = state
        .course_repository
        .update(&course)
        .await?
        .ok_or_else(|| ApiError::not_found("course", id))?;

    Ok(Json(course))
}

pub async fn cancel_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    state
        .course_repository
        .set_state(id, LifecycleState::Cancelled)
        .await?
        .ok_or_else(|| ApiError::not_found("course", id))?;

    Ok(no_content())
}

pub async fn restore_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let course = state
        .course_repository
        .set_state(id, LifecycleState::Active)
        .await?
        .ok_or_else(|| ApiError::not_found("course", id))?;

    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    if !state.course_repository.delete(id).await? {
        return Err(ApiError::not_found("course", id));
    }
    tracing::info!(course_id = %id, "Course deleted");
    Ok(no_content())
}
