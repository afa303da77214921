//! GitHub REST API constants used for app authentication

/// Public GitHub REST API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// REST API version pinned on every request
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Media type GitHub recommends for REST requests
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// User-Agent sent with token exchange requests (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("gh-token-pool/", env!("CARGO_PKG_VERSION"));

/// Backdate `iat` to tolerate clock drift between us and GitHub
pub const JWT_CLOCK_DRIFT_SECS: i64 = 60;

/// GitHub rejects app JWTs valid for longer than ten minutes
pub const JWT_LIFETIME_SECS: i64 = 600;

/// Token type GitHub expects in the Authorization header for installation tokens
pub const INSTALLATION_TOKEN_TYPE: &str = "token";
