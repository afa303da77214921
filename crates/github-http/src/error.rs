//! Error types for retrying HTTP execution

/// Errors from `RetryClient::execute`.
///
/// Retryable statuses are never errors: once retries are exhausted the last
/// response is returned as `Ok` and the caller inspects its status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request body cannot be cloned for retries (streaming bodies are not supported)")]
    RequestNotCloneable,
}

/// Result alias for HTTP operations.
pub type Result<T> = std::result::Result<T, Error>;
