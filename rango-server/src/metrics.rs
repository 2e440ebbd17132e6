/// Prometheus metrics for the Rango server
///
/// Request metrics are recorded by the [`track_requests`] middleware; counter
/// and error metrics by the handlers. Everything is exposed at `/metrics`.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    Encoder, HistogramVec, IntCounterVec, IntGauge, Registry, TextEncoder,
};
use std::sync::Once;
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total number of HTTP requests by route and status
    ///
    /// Labels:
    /// - route: matched route pattern (e.g. /category/:slug/)
    /// - status: numeric HTTP status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!(
            "rango_http_requests_total",
            "Total number of HTTP requests"
        ),
        &["route", "status"]
    )
    .unwrap();

    /// HTTP request duration in seconds
    ///
    /// Labels:
    /// - route: matched route pattern
    pub static ref HTTP_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        histogram_opts!(
            "rango_http_duration_seconds",
            "HTTP request duration in seconds",
            vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
        ),
        &["route"]
    )
    .unwrap();

    /// Counter increments by kind
    ///
    /// Labels:
    /// - kind: category_views, category_likes or page_views
    pub static ref COUNTER_INCREMENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!(
            "rango_counter_increments_total",
            "Total number of view and like increments"
        ),
        &["kind"]
    )
    .unwrap();

    /// Number of visitor sessions held by the server
    pub static ref ACTIVE_SESSIONS: IntGauge = register_int_gauge!(
        opts!(
            "rango_active_sessions",
            "Number of visitor sessions in the session store"
        )
    )
    .unwrap();

    /// Total number of error responses by error code
    ///
    /// Labels:
    /// - code: stable error code (NOT_FOUND, ALREADY_EXISTS, ...)
    pub static ref ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!(
            "rango_errors_total",
            "Total number of errors by code"
        ),
        &["code"]
    )
    .unwrap();

    /// Total number of rate-limited requests
    pub static ref RATE_LIMITED_REQUESTS: IntCounterVec = register_int_counter_vec!(
        opts!(
            "rango_rate_limited_requests_total",
            "Total number of rate-limited requests"
        ),
        &["route"]
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry. Safe to call repeatedly.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
            .expect("Failed to register HTTP_REQUESTS_TOTAL");

        REGISTRY
            .register(Box::new(HTTP_DURATION_SECONDS.clone()))
            .expect("Failed to register HTTP_DURATION_SECONDS");

        REGISTRY
            .register(Box::new(COUNTER_INCREMENTS_TOTAL.clone()))
            .expect("Failed to register COUNTER_INCREMENTS_TOTAL");

        REGISTRY
            .register(Box::new(ACTIVE_SESSIONS.clone()))
            .expect("Failed to register ACTIVE_SESSIONS");

        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("Failed to register ERRORS_TOTAL");

        REGISTRY
            .register(Box::new(RATE_LIMITED_REQUESTS.clone()))
            .expect("Failed to register RATE_LIMITED_REQUESTS");
    });
}

/// Encode metrics in Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Middleware recording request count and latency per matched route
pub async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    HTTP_DURATION_SECONDS
        .with_label_values(&[route.as_str()])
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[route.as_str(), response.status().as_str()])
        .inc();

    response
}
