use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Global metrics registry
static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// All application metrics
pub struct Metrics {
    // HTTP request metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // Cache metrics: hit, miss, write_error
    pub cache_events: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn new(registry: &Registry) -> Self {
        // ── HTTP request metrics ──────────────────────────────────────
        let http_requests_total = IntCounterVec::new(
            Opts::new("fv_http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("failed to create http_requests_total metric");

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "fv_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["method", "path"],
        )
        .expect("failed to create http_request_duration metric");

        // ── Cache metrics ─────────────────────────────────────────────
        let cache_events = IntCounterVec::new(
            Opts::new("fv_cache_events_total", "Cache lookups and failed cache writes"),
            &["event"],
        )
        .expect("failed to create cache_events metric");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("register http_requests_total");
        registry
            .register(Box::new(http_request_duration.clone()))
            .expect("register http_request_duration");
        registry
            .register(Box::new(cache_events.clone()))
            .expect("register cache_events");

        Self {
            http_requests_total,
            http_request_duration,
            cache_events,
        }
    }
}

/// Get the global metrics instance, initializing on first call
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let registry = REGISTRY.get_or_init(Registry::new);
        Metrics::new(registry)
    })
}

/// Axum handler for GET /metrics, Prometheus text format
pub async fn handle_metrics() -> Response {
    // Ensure all metric collectors are registered on first call.
    let _ = metrics();
    let registry = REGISTRY.get_or_init(Registry::new);
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Axum middleware that records HTTP request count and duration.
pub async fn track_metrics(request: Request<axum::body::Body>, next: Next) -> Response {
    let method = request.method().to_string();
    // Label by route template so flag names do not explode cardinality.
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let m = metrics();
    m.http_requests_total
        .with_label_values(&[&method, &path, &status])
        .inc();
    m.http_request_duration
        .with_label_values(&[&method, &path])
        .observe(elapsed);

    response
}

/// Axum handler for GET /health, always 200
pub async fn handle_health_check() -> Response {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({"status": "ok"})),
    )
        .into_response()
}
