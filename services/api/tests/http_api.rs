//! HTTP behaviour that does not depend on database contents
//!
//! Every request here is rejected, or answered, before a handler touches
//! the pool, so no database is required.

mod support;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use support::{body_json, build_test_app, get, send_json};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

const PREFIX: &str = "/api/v1";

#[tokio::test]
async fn health_check_returns_ok() {
    let response = get(build_test_app(PREFIX), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn welcome_names_the_project() {
    let response = get(build_test_app(PREFIX), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Welcome to the Driving School API");
    assert_eq!(json["version"], "0.1.0");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(build_test_app(PREFIX), "/api/v1/no-such-resource").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resources_live_under_the_configured_prefix() {
    let review = json!({
        "reviewer_name": "Sam",
        "email": "sam@example.com",
        "rating": 9,
    });

    let response = send_json(build_test_app("/v2"), Method::POST, "/v2/reviews", review.clone()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_json(build_test_app("/v2"), Method::POST, "/api/v1/reviews", review).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_email_is_rejected_with_error_body() {
    let response = send_json(
        build_test_app(PREFIX),
        Method::POST,
        "/api/v1/users",
        json!({ "email": "not-an-email", "role": "student" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Invalid email format");
}

#[tokio::test]
async fn review_rating_must_be_one_to_five() {
    let response = send_json(
        build_test_app(PREFIX),
        Method::POST,
        "/api/v1/reviews",
        json!({
            "reviewer_name": "Sam",
            "email": "sam@example.com",
            "rating": 0,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Rating must be between 1 and 5");
}

#[tokio::test]
async fn course_prices_are_validated() {
    let response = send_json(
        build_test_app(PREFIX),
        Method::POST,
        "/api/v1/courses",
        json!({
            "title": "Automatic Starter",
            "description": "Five lessons",
            "bullet_pt1": "Flexible times",
            "bullet_pt2": "Modern cars",
            "bullet_pt3": "Test route practice",
            "duration": "5 hours",
            "package_type": "automatic",
            "total_price": 300.0,
            "discounted_price": 350.0,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Discounted price must not exceed the total price"
    );
}

#[tokio::test]
async fn inverted_price_range_is_rejected() {
    let response = get(
        build_test_app(PREFIX),
        "/api/v1/courses/price-range?min_price=500&max_price=100",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_search_term_is_rejected() {
    let response = get(build_test_app(PREFIX), "/api/v1/courses/search?q=%20").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_duration_is_validated_before_scheduling() {
    let response = send_json(
        build_test_app(PREFIX),
        Method::POST,
        "/api/v1/class_sessions",
        json!({
            "course_id": Uuid::new_v4(),
            "instructor_id": Uuid::new_v4(),
            "start_at": "2030-05-06T10:00:00Z",
            "duration_minutes": 0,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"],
        "duration must be between 1 and 1440 minutes, got 0"
    );
}

#[tokio::test]
async fn conflict_check_validates_duration() {
    let uri = format!(
        "/api/v1/class_sessions/conflicts?instructor_id={}&start_at=2030-05-06T10:00:00Z&duration_minutes=1441",
        Uuid::new_v4()
    );
    let response = get(build_test_app(PREFIX), &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_time_at_the_end_of_the_calendar_is_a_validation_error() {
    let response = send_json(
        build_test_app(PREFIX),
        Method::POST,
        "/api/v1/class_sessions",
        json!({
            "course_id": Uuid::new_v4(),
            "instructor_id": Uuid::new_v4(),
            "start_at": "+262142-12-31T23:30:00Z",
            "duration_minutes": 60,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "start time out of range");

    let uri = format!(
        "/api/v1/class_sessions/conflicts?instructor_id={}&start_at=%2B262142-12-31T23:30:00Z&duration_minutes=60",
        Uuid::new_v4()
    );
    let response = get(build_test_app(PREFIX), &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "start time out of range");
}

#[tokio::test]
async fn mistyped_body_field_gets_the_error_body() {
    let response = send_json(
        build_test_app(PREFIX),
        Method::POST,
        "/api/v1/class_sessions",
        json!({
            "course_id": Uuid::new_v4(),
            "instructor_id": Uuid::new_v4(),
            "start_at": "2030-05-06T10:00:00Z",
            "duration_minutes": "sixty",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn malformed_path_and_query_get_the_error_body() {
    let app = build_test_app(PREFIX);

    let response = get(app.clone(), "/api/v1/class_sessions/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let uri = format!(
        "/api/v1/class_sessions/conflicts?instructor_id={}&start_at=tomorrow&duration_minutes=60",
        Uuid::new_v4()
    );
    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn upcoming_window_is_bounded() {
    let app = build_test_app(PREFIX);
    let response = get(app.clone(), "/api/v1/class_sessions/upcoming?hours_ahead=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app, "/api/v1/class_sessions/upcoming?hours_ahead=169").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_phone_is_validated_first() {
    let response = send_json(
        build_test_app(PREFIX),
        Method::POST,
        "/api/v1/bookings",
        json!({
            "student_id": Uuid::new_v4(),
            "class_session_id": Uuid::new_v4(),
            "phone_no": "call me",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_booking_status_is_rejected() {
    let response = get(build_test_app(PREFIX), "/api/v1/bookings/status/finished").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "unknown booking status 'finished'");
}

#[tokio::test]
async fn payment_amount_must_be_positive() {
    let response = send_json(
        build_test_app(PREFIX),
        Method::POST,
        "/api/v1/payments",
        json!({
            "student_id": Uuid::new_v4(),
            "course_id": Uuid::new_v4(),
            "amount": -20.0,
            "payment_method": "card",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Amount must be greater than zero");
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = build_test_app(PREFIX).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
