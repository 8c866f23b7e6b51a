//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use scheduling::{SchedulingError, StoreError};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Referenced resource is missing
    #[error("{0}")]
    NotFound(String),

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// A uniqueness rule rejected the request
    #[error("{0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Scheduling rule violation or store failure
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

impl ApiError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Turn a unique violation on `constraint` into a conflict carrying
    /// `message`, passing any other error through
    pub fn on_unique(constraint: &str, message: &str) -> impl FnOnce(DatabaseError) -> Self {
        let constraint = constraint.to_string();
        let message = message.to_string();
        move |e| {
            if e.violates(&constraint) {
                ApiError::Conflict(message)
            } else {
                ApiError::Database(e)
            }
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::Database(err) => classify_database_error(err),
            ApiError::Scheduling(err) => classify_scheduling_error(err),
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error".to_string(),
    )
}

fn classify_database_error(err: &DatabaseError) -> (StatusCode, &'static str, String) {
    if let Some(constraint) = err.unique_violation() {
        return (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {}", constraint),
        );
    }
    tracing::error!(error = %err, "Database error");
    internal()
}

fn classify_scheduling_error(err: &SchedulingError) -> (StatusCode, &'static str, String) {
    match err {
        SchedulingError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        SchedulingError::SchedulingConflict { .. } => {
            (StatusCode::CONFLICT, "SCHEDULING_CONFLICT", err.to_string())
        }
        SchedulingError::DuplicateBooking { .. } => {
            (StatusCode::CONFLICT, "DUPLICATE_BOOKING", err.to_string())
        }
        SchedulingError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        SchedulingError::Store(StoreError::UniqueViolation(constraint)) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {}", constraint),
        ),
        SchedulingError::Store(StoreError::Backend(e)) => {
            tracing::error!(error = %e, "Store error");
            internal()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use scheduling::TimeWindow;
    use uuid::Uuid;

    #[test]
    fn scheduling_errors_map_to_http_statuses() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
        let cases = [
            (
                SchedulingError::not_found("class session", Uuid::nil()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                SchedulingError::SchedulingConflict {
                    session_id: Uuid::nil(),
                    window: TimeWindow::spanning(start, 60),
                },
                StatusCode::CONFLICT,
                "SCHEDULING_CONFLICT",
            ),
            (
                SchedulingError::DuplicateBooking {
                    student_id: Uuid::nil(),
                    class_session_id: Uuid::nil(),
                },
                StatusCode::CONFLICT,
                "DUPLICATE_BOOKING",
            ),
            (
                SchedulingError::Validation("duration must be positive".to_string()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let (actual_status, actual_code, _) = ApiError::from(err).parts();
            assert_eq!(actual_status, status);
            assert_eq!(actual_code, code);
        }
    }

    #[test]
    fn backend_failures_are_sanitised() {
        let err = ApiError::from(SchedulingError::Store(StoreError::Backend(
            anyhow::anyhow!("password authentication failed for user postgres"),
        )));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn conflict_message_names_the_window() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
        let err = ApiError::from(SchedulingError::SchedulingConflict {
            session_id: Uuid::nil(),
            window: TimeWindow::spanning(start, 90),
        });
        let (_, _, message) = err.parts();
        assert!(message.contains("2030-01-01T10:00:00+00:00 to 2030-01-01T11:30:00+00:00"));
    }
}
