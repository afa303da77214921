//! GitHub rate limit header reporting
//!
//! GitHub reports quota on most responses via `x-ratelimit-*` headers. These
//! are logged for observability only and never influence retry decisions.

use reqwest::header::HeaderMap;
use tracing::debug;

const LIMIT: &str = "x-ratelimit-limit";
const REMAINING: &str = "x-ratelimit-remaining";
const USED: &str = "x-ratelimit-used";
const RESET: &str = "x-ratelimit-reset";
const RESOURCE: &str = "x-ratelimit-resource";

/// Rate limit quota as reported by a single response.
///
/// Values are kept as raw header text; missing headers are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: String,
    pub remaining: String,
    pub used: String,
    pub reset: String,
    pub resource: String,
}

impl RateLimit {
    /// Extract quota headers; `None` unless `limit` or `remaining` is present.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let quota = Self {
            limit: get(LIMIT),
            remaining: get(REMAINING),
            used: get(USED),
            reset: get(RESET),
            resource: get(RESOURCE),
        };
        if quota.limit.is_empty() && quota.remaining.is_empty() {
            None
        } else {
            Some(quota)
        }
    }
}

/// Log the rate limit headers of a response.
pub fn log_rate_limit_headers(operation: &str, url: &str, status: u16, headers: &HeaderMap) {
    match RateLimit::from_headers(headers) {
        Some(quota) => debug!(
            operation,
            url,
            status,
            limit = %quota.limit,
            remaining = %quota.remaining,
            used = %quota.used,
            reset = %quota.reset,
            resource = %quota.resource,
            "github rate limit"
        ),
        None => debug!(operation, url, status, "github response (no rate limit headers)"),
    }
}
