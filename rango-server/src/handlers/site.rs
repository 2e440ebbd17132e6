use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::{metrics, models::*, state::AppState, visitor::CurrentVisitor};

/// Index: most liked categories, most viewed pages and the visit count
///
/// GET /
pub async fn index(
    State(state): State<AppState>,
    visitor: CurrentVisitor,
) -> (CookieJar, Json<IndexResponse>) {
    let top_n = state.directory.config().top_n;
    let categories = state.directory.top_categories(top_n);
    let pages = state.directory.top_pages(top_n);

    let body = IndexResponse {
        categories: categories.iter().map(CategoryResponse::from).collect(),
        pages: pages.iter().map(PageResponse::from).collect(),
        visits: visitor.state.visits,
    };

    (visitor.jar, Json(body))
}

/// GET /about
pub async fn about(visitor: CurrentVisitor) -> (CookieJar, Json<AboutResponse>) {
    let body = AboutResponse {
        visits: visitor.state.visits,
        last_visit: visitor.state.last_visit,
    };

    (visitor.jar, Json(body))
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// Directory statistics
///
/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.directory.stats();

    Json(serde_json::json!({
        "total_categories": stats.total_categories,
        "total_pages": stats.total_pages,
        "total_category_views": stats.total_category_views,
        "total_category_likes": stats.total_category_likes,
        "total_page_views": stats.total_page_views,
        "active_sessions": state.sessions.count(),
    }))
}

/// GET /metrics
pub async fn metrics_handler() -> String {
    metrics::encode_metrics().unwrap_or_else(|e| {
        tracing::error!("Failed to encode metrics: {}", e);
        String::from("# Error encoding metrics\n")
    })
}
