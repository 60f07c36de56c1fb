//! Prometheus metrics for feed-service

use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
};
use std::future::Future;
use std::time::{Duration, Instant};

/// `path` label for requests that match no registered route
pub const UNMATCHED_PATH_LABEL: &str = "unmatched";

static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_service_http_requests_total",
        "Total HTTP requests handled by feed-service",
        &["method", "path", "status"]
    )
    .expect("failed to register feed_service_http_requests_total")
});

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "feed_service_http_request_duration_seconds",
        "HTTP request latency for feed-service",
        &["method", "path", "status"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("failed to register feed_service_http_request_duration_seconds")
});

static FEED_COMPUTE_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "recommended_feed_duration_seconds",
        "Recommended feed computation time (fetch + rank)",
        &["status"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("failed to register recommended_feed_duration_seconds")
});

static CANDIDATE_POOL_SIZE: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "recommended_feed_candidate_pool_size",
        "Number of candidates scored per recommended feed request",
        vec![0.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0, 50000.0]
    )
    .expect("failed to register recommended_feed_candidate_pool_size")
});

static BASELINE_SOURCE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "emotion_baseline_source_total",
        "Emotional baselines computed, by the signals that produced them",
        &["source"]
    )
    .expect("failed to register emotion_baseline_source_total")
});

pub fn observe_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let status_label = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status_label])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path, &status_label])
        .observe(elapsed.as_secs_f64());
}

/// Route pattern of the request, so path labels stay bounded by the route table
pub fn path_label(req: &ServiceRequest) -> String {
    req.match_pattern()
        .unwrap_or_else(|| UNMATCHED_PATH_LABEL.to_string())
}

/// `wrap_fn` hook recording count and latency for every request
pub fn track_request<S, B>(
    req: ServiceRequest,
    srv: &S,
) -> impl Future<Output = Result<ServiceResponse<B>, actix_web::Error>>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let method = req.method().to_string();
    let path = path_label(&req);
    let start = Instant::now();

    let fut = srv.call(req);
    async move {
        let res = fut.await;
        let status = match &res {
            Ok(res) => res.status().as_u16(),
            Err(err) => err.as_response_error().status_code().as_u16(),
        };
        observe_http_request(&method, &path, status, start.elapsed());
        res
    }
}

pub fn observe_feed_computation(success: bool, elapsed: Duration) {
    let status = if success { "success" } else { "error" };
    FEED_COMPUTE_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(elapsed.as_secs_f64());
}

pub fn observe_candidate_pool(size: usize) {
    CANDIDATE_POOL_SIZE.observe(size as f64);
}

pub fn record_baseline_source(source: &str) {
    BASELINE_SOURCE_TOTAL.with_label_values(&[source]).inc();
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
