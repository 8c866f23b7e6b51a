//! Booking routes

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use scheduling::model::{BookingFilter, BookingStatus};
use tracing::warn;
use uuid::Uuid;

use super::{created, no_content, parse_label};
use crate::{
    AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        Pagination,
        booking::{BookingQuery, BookingStatusRequest, CreateBookingRequest, UpdateBookingRequest},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/student/:student_id", get(bookings_for_student))
        .route("/status/:status", get(bookings_with_status))
        .route("/class_session/:class_session_id", get(bookings_for_session))
        .route(
            "/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/:id/status", put(set_booking_status))
}

async fn list_filtered(
    state: &AppState,
    filter: BookingFilter,
    pagination: &Pagination,
) -> ApiResult<impl IntoResponse + use<>> {
    let bookings = state.bookings.list(&filter, pagination.page()).await?;
    Ok(Json(bookings))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiQuery(query): ApiQuery<BookingQuery>,
) -> ApiResult<impl IntoResponse> {
    list_filtered(&state, query.into(), &pagination).await
}

pub async fn bookings_for_student(
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<Uuid>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let filter = BookingFilter {
        student_id: Some(student_id),
        ..Default::default()
    };
    list_filtered(&state, filter, &pagination).await
}

pub async fn bookings_with_status(
    State(state): State<AppState>,
    ApiPath(status): ApiPath<String>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let filter = BookingFilter {
        status: Some(parse_label::<BookingStatus>(&status)?),
        ..Default::default()
    };
    list_filtered(&state, filter, &pagination).await
}

pub async fn bookings_for_session(
    State(state): State<AppState>,
    ApiPath(class_session_id): ApiPath<Uuid>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let filter = BookingFilter {
        class_session_id: Some(class_session_id),
        ..Default::default()
    };
    list_filtered(&state, filter, &pagination).await
}

/// Book a class session
///
/// The instructor is notified once the booking is stored; a failed
/// notification does not fail the request.
pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBookingRequest>,
) -> ApiResult<Response> {
    let booking = state
        .bookings
        .create(payload.student_id, payload.class_session_id, payload.details())
        .await?;

    match state.sessions.get(booking.class_session_id).await {
        Ok(session) => {
            state
                .notifications
                .notify_instructor_of_booking(&session, booking.id)
                .await
        }
        Err(e) => warn!(booking_id = %booking.id, error = %e, "Skipping instructor notification"),
    }

    Ok(created(booking))
}

pub async fn get_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.get(id).await?))
}

/// Update contact details and remarks
pub async fn update_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.bookings.update_details(id, payload.into()).await?;
    Ok(Json(booking))
}

pub async fn set_booking_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BookingStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.bookings.set_status(id, payload.status).await?;
    Ok(Json(booking))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    state.bookings.delete(id).await?;
    Ok(no_content())
}
