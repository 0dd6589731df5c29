//! Prometheus metrics for the API server and render pipeline.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the Prometheus recorder. Returns a handle that renders the
/// current metric set for the `/metrics` endpoint.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "shortclip_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "shortclip_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "shortclip_http_requests_in_flight";

    pub const JOBS_CREATED_TOTAL: &str = "shortclip_jobs_created_total";
    pub const JOBS_DONE_TOTAL: &str = "shortclip_jobs_done_total";
    pub const JOBS_FAILED_TOTAL: &str = "shortclip_jobs_failed_total";
    pub const JOBS_RUNNING: &str = "shortclip_jobs_running";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "shortclip_rate_limit_hits_total";
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];
    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_job_created() {
    counter!(names::JOBS_CREATED_TOTAL).increment(1);
}

pub fn record_job_done() {
    counter!(names::JOBS_DONE_TOTAL).increment(1);
}

pub fn record_job_failed() {
    counter!(names::JOBS_FAILED_TOTAL).increment(1);
}

pub fn set_jobs_running(count: i64) {
    gauge!(names::JOBS_RUNNING).set(count as f64);
}

pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Replace job ids in the path with a placeholder so each distinct job
/// doesn't create its own metric series.
fn sanitize_path(path: &str) -> String {
    match path.split('/').collect::<Vec<_>>().as_slice() {
        ["", "jobs", _id, rest @ ..] if !rest.is_empty() => {
            format!("/jobs/:job_id/{}", rest.join("/"))
        }
        ["", "jobs", _id] => "/jobs/:job_id".to_string(),
        _ => path.to_string(),
    }
}

pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    record_http_request(&method, &path, status, start.elapsed().as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_job_id_segment() {
        assert_eq!(sanitize_path("/jobs/abc-123"), "/jobs/:job_id");
        assert_eq!(sanitize_path("/jobs/abc-123/retry"), "/jobs/:job_id/retry");
        assert_eq!(sanitize_path("/healthz"), "/healthz");
    }
}
