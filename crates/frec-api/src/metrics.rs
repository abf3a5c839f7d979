//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;
use uuid::Uuid;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "frec_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "frec_http_request_duration_seconds";

    // Pipeline metrics
    pub const UPLOADS_TOTAL: &str = "frec_uploads_total";
    pub const FACES_DETECTED_TOTAL: &str = "frec_faces_detected_total";
    pub const ENHANCEMENTS_TOTAL: &str = "frec_enhancements_total";
    pub const ENHANCEMENT_FALLBACKS_TOTAL: &str = "frec_enhancement_fallbacks_total";
    pub const ENHANCEMENT_DURATION_SECONDS: &str = "frec_enhancement_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an accepted upload.
pub fn record_upload(faces_found: u32) {
    counter!(names::UPLOADS_TOTAL).increment(1);
    if faces_found > 0 {
        counter!(names::FACES_DETECTED_TOTAL).increment(faces_found as u64);
    }
}

/// Record a completed enhancement.
pub fn record_enhancement(profile: &str, method: &str, duration_secs: f64) {
    let labels = [
        ("profile", profile.to_string()),
        ("method", method.to_string()),
    ];
    counter!(names::ENHANCEMENTS_TOTAL, &labels).increment(1);
    histogram!(names::ENHANCEMENT_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an enhancement that resolved via the local fallback.
pub fn record_enhancement_fallback(profile: &str) {
    let labels = [("profile", profile.to_string())];
    counter!(names::ENHANCEMENT_FALLBACKS_TOTAL, &labels).increment(1);
}

/// Replace generated id path segments so metrics don't explode in
/// cardinality.
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware recording request counts and latency.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_uuid_segments() {
        let path = format!("/api/case/{}", Uuid::new_v4());
        assert_eq!(sanitize_path(&path), "/api/case/:id");
        assert_eq!(sanitize_path("/api/cases"), "/api/cases");
    }
}
