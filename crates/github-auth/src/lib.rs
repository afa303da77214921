//! GitHub App authentication
//!
//! Validates GitHub App identities, signs app JWTs, and exchanges them for
//! installation access tokens. The exchange sits behind the `Mint` trait so
//! token caches can be driven by any minting strategy (including test fakes).
//!
//! Token flow:
//! 1. `AppIdentity::new()` validates the app id, installation id and RSA key
//! 2. `jwt::generate_app_jwt()` signs a short-lived RS256 assertion
//! 3. `InstallationMinter` POSTs it to `/app/installations/{id}/access_tokens`
//! 4. The returned `Token` is cached by the caller until near expiry

pub mod constants;
pub mod error;
pub mod identity;
pub mod jwt;
pub mod token;

pub use constants::*;
pub use error::{Error, Result};
pub use identity::{AppConfig, AppIdentity};
pub use jwt::generate_app_jwt;
pub use token::{InstallationMinter, InstallationTokenResponse, Mint, MintFuture, Token};
