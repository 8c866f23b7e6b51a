//! FAQ category and question routes

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
        faq::{
            CreateFaqRequest, FaqCategoryRequest, FaqQuery, MAX_CATEGORY_TITLE_LEN,
            MAX_QUESTION_LEN, UpdateFaqRequest,
        },
    },
    repositories::faq::CATEGORY_TITLE_CONSTRAINT,
    validation::validate_required,
};

const DUPLICATE_CATEGORY: &str = "FAQ category title already exists";

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category)
                .put(rename_category)
                .delete(delete_category),
        )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_faqs).post(create_faq))
        .route("/:id", get(get_faq).put(update_faq).delete(delete_faq))
}

fn validate_title(title: &str) -> ApiResult<()> {
    validate_required("Title", title, MAX_CATEGORY_TITLE_LEN).map_err(ApiError::Validation)
}

fn validate_question(question: &str, answer: &str) -> ApiResult<()> {
    validate_required("Question", question, MAX_QUESTION_LEN).map_err(ApiError::Validation)?;
    validate_required("Answer", answer, usize::MAX).map_err(ApiError::Validation)
}

pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let categories = state
        .faq_repository
        .list_categories(pagination.page())
        .await?;

    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<FaqCategoryRequest>,
) -> ApiResult<Response> {
    validate_title(&payload.title)?;

    let category = state
        .faq_repository
        .create_category(payload.title.trim())
        .await
        .map_err(ApiError::on_unique(CATEGORY_TITLE_CONSTRAINT, DUPLICATE_CATEGORY))?;

    Ok(created(category))
}

pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let category = state
        .faq_repository
        .find_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("faq category", id))?;

    Ok(Json(category))
}

pub async fn rename_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<FaqCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_title(&payload.title)?;

    let category = state
        .faq_repository
        .rename_category(id, payload.title.trim())
        .await
        .map_err(ApiError::on_unique(CATEGORY_TITLE_CONSTRAINT, DUPLICATE_CATEGORY))?
        .ok_or_else(|| ApiError::not_found("faq category", id))?;

    Ok(Json(category))
}

/// Delete a category and every question in it
pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    if !state.faq_repository.delete_category(id).await? {
        return Err(ApiError::not_found("faq category", id));
    }
    Ok(no_content())
}

pub async fn list_faqs(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiQuery(query): ApiQuery<FaqQuery>,
) -> ApiResult<impl IntoResponse> {
    let faqs = state
        .faq_repository
        .list_faqs(query.category_id, pagination.page())
        .await?;

    Ok(Json(faqs))
}

/// Add a question to an existing category
pub async fn create_faq(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateFaqRequest>,
) -> ApiResult<Response> {
    validate_question(&payload.question, &payload.answer)?;

    if !state
        .faq_repository
        .category_exists(payload.category_id)
        .await?
    {
        return Err(ApiError::not_found("faq category", payload.category_id));
    }

    let faq = state.faq_repository.create_faq(&payload).await?;

    Ok(created(faq))
}

pub async fn get_faq(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let faq = state
        .faq_repository
        .find_faq(id)
        .await?
        .ok_or_else(|| ApiError::not_found("faq", id))?;

    Ok(Json(faq))
}

pub async fn update_faq(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateFaqRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut faq = state
        .faq_repository
        .find_faq(id)
        .await?
        .ok_or_else(|| ApiError::not_found("faq", id))?;

    if let Some(category_id) = payload.category_id {
        if !state.faq_repository.category_exists(category_id).await? {
            return Err(ApiError::not_found("faq category", category_id));
        }
        faq.category_id = category_id;
    }
    if let Some(question) = payload.question {
        faq.question = question;
    }
    if let Some(answer) = payload.answer {
        faq.answer = answer;
    }
    validate_question(&faq.question, &faq.answer)?;

    let faq = state
        .faq_repository
        .update_faq(&faq)
        .await?
        .ok_or_else(|| ApiError::not_found("faq", id))?;

    Ok(Json(faq))
}

pub async fn delete_faq(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    if !state.faq_repository.delete_faq(id).await? {
        return Err(ApiError::not_found("faq", id));
    }
    Ok(no_content())
}
