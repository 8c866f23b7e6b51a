//! Payment routes

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use uuid::Uuid;

use super::{created, no_content, parse_label};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        DeletedCount, Pagination,
        payment::{
            CreatePaymentRequest, MAX_PAYMENT_METHOD_LEN, MAX_TRANSACTION_ID_LEN, PaymentQuery,
            PaymentStatus, PaymentStatusRequest, UpdatePaymentRequest,
        },
    },
    repositories::payment::TRANSACTION_ID_CONSTRAINT,
    validation::{validate_amount, validate_required},
};

const DUPLICATE_TRANSACTION: &str = "Transaction id already recorded";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(create_payment))
        .route(
            "/student/:student_id",
            get(payments_for_student).delete(delete_student_payments),
        )
        .route(
            "/course/:course_id",
            get(payments_for_course).delete(delete_course_payments),
        )
        .route("/status/:status", get(payments_with_status))
        .route(
            "/:id",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
        .route("/:id/status", put(set_payment_status))
}

async fn list_filtered(
    state: &AppState,
    query: PaymentQuery,
    pagination: &Pagination,
) -> ApiResult<impl IntoResponse + use<>> {
    let payments = state
        .payment_repository
        .list(&query, pagination.page())
        .await?;

    Ok(Json(payments))
}

/// List payments, newest first
pub async fn list_payments(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiQuery(query): ApiQuery<PaymentQuery>,
) -> ApiResult<impl IntoResponse> {
    list_filtered(&state, query, &pagination).await
}

pub async fn payments_for_student(
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<Uuid>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let query = PaymentQuery {
        student_id: Some(student_id),
        ..Default::default()
    };
    list_filtered(&state, query, &pagination).await
}

pub async fn payments_for_course(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<Uuid>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let query = PaymentQuery {
        course_id: Some(course_id),
        ..Default::default()
    };
    list_filtered(&state, query, &pagination).await
}

pub async fn payments_with_status(
    State(state): State<AppState>,
    ApiPath(status): ApiPath<String>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let query = PaymentQuery {
        status: Some(parse_label::<PaymentStatus>(&status)?),
        ..Default::default()
    };
    list_filtered(&state, query, &pagination).await
}

fn validate_transaction_id(transaction_id: Option<&str>) -> Result<(), String> {
    match transaction_id {
        Some(id) => validate_required("Transaction id", id, MAX_TRANSACTION_ID_LEN),
        None => Ok(()),
    }
}

/// Record a payment for an existing student and course
pub async fn create_payment(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePaymentRequest>,
) -> ApiResult<Response> {
    validate_amount(payload.amount).map_err(ApiError::Validation)?;
    validate_required("Payment method", &payload.payment_method, MAX_PAYMENT_METHOD_LEN)
        .map_err(ApiError::Validation)?;
    validate_transaction_id(payload.transaction_id.as_deref()).map_err(ApiError::Validation)?;

    if state
        .user_repository
        .find_by_id(payload.student_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("student", payload.student_id));
    }
    if state
        .course_repository
        .find_by_id(payload.course_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("course", payload.course_id));
    }

    if let Some(transaction_id) = &payload.transaction_id {
        if state
            .payment_repository
            .transaction_id_taken(transaction_id, None)
            .await?
        {
            return Err(ApiError::Conflict(DUPLICATE_TRANSACTION.to_string()));
        }
    }

    let payment = state
        .payment_repository
        .create(&payload)
        .await
        .map_err(ApiError::on_unique(TRANSACTION_ID_CONSTRAINT, DUPLICATE_TRANSACTION))?;

    Ok(created(payment))
}

pub async fn get_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let payment = state
        .payment_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("payment", id))?;

    Ok(Json(payment))
}

/// Change status and/or transaction id
///
/// A new transaction id must not belong to any other payment.
pub async fn update_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdatePaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_transaction_id(payload.transaction_id.as_deref()).map_err(ApiError::Validation)?;

    let current = state
        .payment_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("payment", id))?;

    if let Some(transaction_id) = &payload.transaction_id {
        if state
            .payment_repository
            .transaction_id_taken(transaction_id, Some(id))
            .await?
        {
            return Err(ApiError::Conflict(DUPLICATE_TRANSACTION.to_string()));
        }
    }

    let status = payload.status.unwrap_or(current.status);
    let transaction_id = payload.transaction_id.or(current.transaction_id);

    let payment = state
        .payment_repository
        .update(id, status, transaction_id.as_deref())
        .await
        .map_err(ApiError::on_unique(TRANSACTION_ID_CONSTRAINT, DUPLICATE_TRANSACTION))?
        .ok_or_else(|| ApiError::not_found("payment", id))?;

    Ok(Json(payment))
}

pub async fn set_payment_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PaymentStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let current = state
        .payment_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("payment", id))?;

    let payment = state
        .payment_repository
        .update(id, payload.status, current.transaction_id.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("payment", id))?;

    tracing::info!(payment_id = %id, status = %payment.status, "Payment status changed");
    Ok(Json(payment))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    if !state.payment_repository.delete(id).await? {
        return Err(ApiError::not_found("payment", id));
    }
    Ok(no_content())
}

pub async fn delete_student_payments(
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.payment_repository.delete_by_student(student_id).await?;
    Ok(Json(DeletedCount { deleted }))
}

pub async fn delete_course_payments(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.payment_repository.delete_by_course(course_id).await?;
    Ok(Json(DeletedCount { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_is_optional_but_bounded() {
        assert!(validate_transaction_id(None).is_ok());
        assert!(validate_transaction_id(Some("txn_8842")).is_ok());
        assert!(validate_transaction_id(Some(" ")).is_err());
        assert!(validate_transaction_id(Some(&"9".repeat(101))).is_err());
    }
}
