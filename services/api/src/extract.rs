//! Request extractors whose rejections render as [`ApiError`]
//!
//! axum's own `Json`, `Query` and `Path` answer malformed input with a
//! plain-text body; these wrappers route it through the usual
//! `{"error","code"}` shape instead.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query-string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;

    #[derive(Deserialize)]
    struct Slot {
        #[allow(dead_code)]
        minutes: i32,
    }

    async fn error_code(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json["code"].as_str().unwrap_or_default().to_string())
    }

    #[tokio::test]
    async fn rejected_extractors_use_the_error_body() {
        let router = Router::new()
            .route(
                "/slot",
                get(|ApiQuery(_): ApiQuery<Slot>| async { "ok" })
                    .post(|ApiJson(_): ApiJson<Slot>| async { "ok" }),
            )
            .route("/slot/:id", get(|ApiPath(_): ApiPath<Uuid>| async { "ok" }));

        let bad_body = Request::post("/slot")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"minutes":"sixty"}"#))
            .unwrap();
        let bad_query = Request::get("/slot?minutes=sixty").body(Body::empty()).unwrap();
        let bad_path = Request::get("/slot/not-a-uuid").body(Body::empty()).unwrap();

        for request in [bad_body, bad_query, bad_path] {
            let (status, code) = error_code(router.clone(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(code, "VALIDATION_ERROR");
        }
    }
}
