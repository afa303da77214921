//! Error types for token pool operations

/// Errors from token sources and the pool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("token pool configuration error: {0}")]
    Config(String),

    /// The mint failed; the underlying error is reported unchanged.
    #[error(transparent)]
    Mint(#[from] github_auth::Error),
}

/// Result alias for pool operations.
pub type Result<T> = std::result::Result<T, Error>;
