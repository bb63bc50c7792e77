//! API module
//!
//! HTTP endpoints, extractors, and middleware.

pub mod extract;
pub mod middleware;
pub mod routes;

use axum::http::Uri;
use axum::Router;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::error::AppError;

pub use routes::create_router;

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// JSON 404 for requests that match no route.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Compose the deployable application: API routes plus health check,
/// request logging, HTTP tracing, fallback, and state. Integration tests
/// drive the same composition via `tower::ServiceExt::oneshot`.
pub fn app(pool: PgPool) -> Router {
    create_router()
        .route("/health", axum::routing::get(health_check))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}
