//! Store metrics.

use metrics::counter;

pub mod names {
    pub const STORE_REQUESTS_TOTAL: &str = "frec_store_requests_total";
    pub const STORE_RETRIES_TOTAL: &str = "frec_store_retries_total";
}

/// Record a store request with its outcome.
pub fn record_request(operation: &str, collection: &str, success: bool) {
    let labels = [
        ("operation", operation.to_string()),
        ("collection", collection.to_string()),
        ("outcome", if success { "ok" } else { "error" }.to_string()),
    ];
    counter!(names::STORE_REQUESTS_TOTAL, &labels).increment(1);
}

/// Record a retried store operation.
pub fn record_retry(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::STORE_RETRIES_TOTAL, &labels).increment(1);
}
