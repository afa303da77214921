//! Retrying HTTP execution for the GitHub REST API
//!
//! GitHub signals throttling with 403/429 and a `Retry-After` header, and
//! transient outages with 5xx. `RetryClient` re-issues a request on those
//! statuses with a bounded number of attempts and a capped wait, honoring
//! `Retry-After` when present and falling back to exponential backoff.
//!
//! The transport sits behind the `Transport` trait; `reqwest::Client`
//! implements it directly.

pub mod error;
pub mod rate_limit;
pub mod retry;
pub mod transport;

pub use error::{Error, Result};
pub use rate_limit::{RateLimit, log_rate_limit_headers};
pub use retry::{
    DEFAULT_MAX_RETRIES, MAX_RETRY_WAIT, RetryClient, RetryPolicy, is_retryable, parse_retry_after,
    retry_wait,
};
pub use transport::{Transport, TransportFuture};
