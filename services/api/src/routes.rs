//! API service routes
//!
//! Every resource router is nested under the configured prefix; `/` and
//! `/health` stay at the root.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use scheduling::model::ParseEnumError;
use serde_json::json;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
};

pub mod bookings;
pub mod class_sessions;
pub mod courses;
pub mod faqs;
pub mod notifications;
pub mod payments;
pub mod progress_reports;
pub mod reviews;
pub mod users;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/users", users::router())
        .nest("/courses", courses::router())
        .nest("/class_sessions", class_sessions::router())
        .nest("/bookings", bookings::router())
        .nest("/payments", payments::router())
        .nest("/progress_reports", progress_reports::router())
        .nest("/reviews", reviews::router())
        .nest("/faq_categories", faqs::category_router())
        .nest("/faqs", faqs::router())
        .nest("/notifications", notifications::router());

    let root = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check));

    let prefix = normalize_prefix(&state.settings.api.prefix);
    let router = if prefix.is_empty() {
        root.merge(api)
    } else {
        root.nest(&prefix, api)
    };

    router.with_state(state)
}

/// `"/api/v1/"` becomes `"/api/v1"`, `"v2"` becomes `"/v2"`, `"/"` becomes `""`
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Welcome endpoint
pub async fn welcome(State(state): State<AppState>) -> impl IntoResponse {
    let project = &state.settings.project;
    Json(json!({
        "message": format!("Welcome to the {}", project.name),
        "version": project.version,
        "description": project.description,
        "docs": state.settings.api.prefix,
    }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Parse a text label taken from the path
pub(crate) fn parse_label<T>(raw: &str) -> ApiResult<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    raw.parse()
        .map_err(|e: ParseEnumError| ApiError::Validation(e.to_string()))
}

pub(crate) fn created<T: serde::Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

pub(crate) fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_normalized() {
        assert_eq!(normalize_prefix("/api/v1"), "/api/v1");
        assert_eq!(normalize_prefix("/api/v1/"), "/api/v1");
        assert_eq!(normalize_prefix("v2"), "/v2");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn unknown_labels_are_validation_errors() {
        let err = parse_label::<scheduling::model::BookingStatus>("done").unwrap_err();
        assert_eq!(err.to_string(), "unknown booking status 'done'");
    }
}
