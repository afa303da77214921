//! Bounded retry loop for throttled and transiently failing requests
//!
//! Each logical request gets at most `max_retries + 1` attempts. Only
//! received responses with a retryable status are retried; transport errors
//! are returned on the spot. Between attempts the wait is taken from
//! `Retry-After` if usable, else `2^attempt` seconds, and is never longer
//! than `max_wait`.

use std::time::{Duration, SystemTime};

use reqwest::header::{HeaderMap, RETRY_AFTER};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::rate_limit::log_rate_limit_headers;
use crate::transport::Transport;

/// Retries after the initial attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ceiling for any single wait between attempts
pub const MAX_RETRY_WAIT: Duration = Duration::from_secs(60);

/// Attempt budget and wait ceiling for a `RetryClient`.
///
/// `max_wait` may lower the ceiling but never raise it above `MAX_RETRY_WAIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    max_wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, max_wait: Duration) -> Self {
        Self {
            max_retries,
            max_wait: max_wait.min(MAX_RETRY_WAIT),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Initial attempt plus retries.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, MAX_RETRY_WAIT)
    }
}

/// Whether a response status should be retried.
///
/// 403 and 429 are GitHub's throttling statuses. Every 5xx is treated as
/// transient except 501, which means the server will never support the call.
pub fn is_retryable(status: u16) -> bool {
    match status {
        403 | 429 => true,
        501 => false,
        500..=599 => true,
        _ => false,
    }
}

/// Parse a `Retry-After` value relative to `now`.
///
/// Accepts delay-seconds or an HTTP-date. Dates in the past, negative or
/// unparseable values, and empty input all yield zero.
pub fn parse_retry_after(value: &str, now: SystemTime) -> Duration {
    let value = value.trim();
    if value.is_empty() {
        return Duration::ZERO;
    }

    if let Ok(seconds) = value.parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    match httpdate::parse_http_date(value) {
        Ok(at) => at.duration_since(now).unwrap_or(Duration::ZERO),
        Err(_) => Duration::ZERO,
    }
}

/// Wait before retry number `attempt` (zero-based), capped at `max_wait` and
/// `MAX_RETRY_WAIT`.
pub fn retry_wait(headers: &HeaderMap, attempt: u32, max_wait: Duration) -> Duration {
    let hinted = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(|v| parse_retry_after(v, SystemTime::now()))
        .unwrap_or_default();

    let wait = if hinted.is_zero() {
        Duration::from_secs(2u64.saturating_pow(attempt))
    } else {
        hinted
    };
    wait.min(max_wait).min(MAX_RETRY_WAIT)
}

/// HTTP client wrapper that retries throttled and transiently failing calls.
pub struct RetryClient<T = reqwest::Client> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `request`, retrying retryable statuses within the policy.
    ///
    /// Every attempt sends its own clone of `request`. Non-retryable
    /// responses (including all successes) are returned immediately. When
    /// the budget runs out the last response is returned as-is, so a
    /// retryable status on an `Ok` result means retries were exhausted.
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        let operation = request.method().to_string();
        let url = request.url().to_string();
        let mut attempt: u32 = 0;

        loop {
            let attempt_request = request.try_clone().ok_or(Error::RequestNotCloneable)?;

            let response = self.transport.send(attempt_request).await.map_err(|e| {
                warn!(operation, url, attempt = attempt + 1, error = %e, "github request failed");
                Error::Transport(e)
            })?;

            let status = response.status().as_u16();
            log_rate_limit_headers(&operation, &url, status, response.headers());

            if !is_retryable(status) {
                debug!(operation, url, status, attempts = attempt + 1, "github request completed");
                return Ok(response);
            }

            if attempt >= self.policy.max_retries {
                warn!(
                    operation,
                    url,
                    status,
                    attempts = attempt + 1,
                    max_attempts = self.policy.max_attempts(),
                    "retries exhausted, returning last response"
                );
                return Ok(response);
            }

            let wait = retry_wait(response.headers(), attempt, self.policy.max_wait);
            // Discard the throttled response before sleeping
            drop(response);

            warn!(
                operation,
                url,
                status,
                attempt = attempt + 1,
                wait_ms = wait.as_millis() as u64,
                "retryable status from github, backing off"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}
