//! Error types for GitHub App authentication

/// Errors from identity validation, JWT signing and token exchange.
///
/// Variants carry rendered messages so the error can be cloned and handed
/// to every caller that waited on the same failed mint.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid app configuration: {0}")]
    Config(String),

    #[error("JWT signing failed: {0}")]
    Signing(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
