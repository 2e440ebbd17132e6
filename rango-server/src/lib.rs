/// Rango HTTP Server
///
/// This crate serves the Rango directory over HTTP: category pages, likes,
/// click-through counting, category suggestions and per-visitor visit counts.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod render;
pub mod state;
pub mod visitor;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

// Re-export key types
pub use config::ServerConfig;
pub use error::AppError;
pub use rango_core::Directory;
pub use rate_limit::RateLimiter;
pub use state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    metrics::register_metrics();

    Router::new()
        .route("/", get(handlers::index))
        .route("/about", get(handlers::about))
        .route("/about/", get(handlers::about))
        // Categories
        .route("/category/:slug", get(handlers::show_category))
        .route("/category/:slug/", get(handlers::show_category))
        .route("/category/:slug/add_page/", post(handlers::add_page))
        .route("/add_category/", post(handlers::add_category))
        .route("/like_category/", get(handlers::like_category))
        .route(
            "/suggest_category/",
            get(handlers::suggest_category).post(handlers::suggest_category_form),
        )
        // Pages
        .route("/goto/", get(handlers::goto))
        // System endpoints
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/stats", get(handlers::stats))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
