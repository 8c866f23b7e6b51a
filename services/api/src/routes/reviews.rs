//! Review routes

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
        review::{
            CreateReviewRequest, MAX_COURSE_TITLE_LEN, MAX_REVIEWER_NAME_LEN, UpdateReviewRequest,
        },
    },
    validation::{validate_email, validate_max_len, validate_rating, validate_required},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/approved", get(list_approved_reviews))
        .route("/course/:course_title", get(reviews_for_course))
        .route(
            "/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
}

fn validate_review(
    reviewer_name: &str,
    email: &str,
    rating: i32,
    course_title: Option<&str>,
) -> Result<(), String> {
    validate_required("Reviewer name", reviewer_name, MAX_REVIEWER_NAME_LEN)?;
    validate_email(email)?;
    validate_rating(rating)?;
    if let Some(title) = course_title {
        validate_max_len("Course title", title, MAX_COURSE_TITLE_LEN)?;
    }
    Ok(())
}

pub async fn list_reviews(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let reviews = state
        .review_repository
        .list(false, None, pagination.page())
        .await?;

    Ok(Json(reviews))
}

pub async fn list_approved_reviews(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let reviews = state
        .review_repository
        .list(true, None, pagination.page())
        .await?;

    Ok(Json(reviews))
}

pub async fn reviews_for_course(
    State(state): State<AppState>,
    ApiPath(course_title): ApiPath<String>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let reviews = state
        .review_repository
        .list(false, Some(&course_title), pagination.page())
        .await?;

    Ok(Json(reviews))
}

/// Leave a review
pub async fn create_review(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateReviewRequest>,
) -> ApiResult<Response> {
    validate_review(
        &payload.reviewer_name,
        &payload.email,
        payload.rating,
        payload.course_title.as_deref(),
    )
    .map_err(ApiError::Validation)?;

    let review = state.review_repository.create(&payload).await?;

    Ok(created(review))
}

pub async fn get_review(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let review = state
        .review_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("review", id))?;

    Ok(Json(review))
}

/// Edit or moderate a review
pub async fn update_review(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut review = state
        .review_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("review", id))?;

    payload.apply_to(&mut review);
    validate_review(
        &review.reviewer_name,
        &review.email,
        review.rating,
        review.course_title.as_deref(),
    )
    .map_err(ApiError::Validation)?;

    let review = state
        .review_repository
        .update(&review)
        .await?
        .ok_or_else(|| ApiError::not_found("review", id))?;

    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    if !state.review_repository.delete(id).await? {
        return Err(ApiError::not_found("review", id));
    }
    Ok(no_content())
}
