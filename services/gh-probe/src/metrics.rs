//! Prometheus metrics
//!
//! - `token_app_selected` (counter): label `app_idx`, emitted by the token pool
//! - `gh_probe_requests_total` (counter): label `status`
//! - `gh_probe_request_duration_seconds` (histogram): label `status`

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const REQUEST_DURATION: &str = "gh_probe_request_duration_seconds";

/// Bucket boundaries span a single fast call up to a request that waited
/// through several capped retries.
const DURATION_BUCKETS: &[f64] = &[
    0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 240.0,
];

fn builder() -> PrometheusBuilder {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)
        .expect("failed to set histogram buckets")
}

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_recorder() -> PrometheusHandle {
    builder()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a completed probe request. `status` is "error" when no response was received.
pub fn record_request(status: &str, duration_secs: f64) {
    metrics::counter!("gh_probe_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!(REQUEST_DURATION, "status" => status.to_string()).record(duration_secs);
}
