//! Driving-school HTTP service
//!
//! The binary in `main.rs` only loads settings, connects and serves; the
//! router is built here so integration tests can drive it directly.

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod notifications;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use state::AppState;

/// Migrations embedded from `services/api/migrations`
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Router with CORS and request tracing applied
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.cors_origins());
    routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}
