//! Token pool for GitHub App installations
//!
//! Spreads API traffic across several GitHub Apps so each app's rate limit
//! budget is consumed evenly. Each app gets a `TokenSource` that caches its
//! installation token and renews it shortly before expiry; the `TokenPool`
//! picks one source per call round-robin.
//!
//! Token lifecycle:
//! 1. Caller asks the pool for a token → pool advances its cursor, picks a source
//! 2. Source returns its cached token if it outlives the renewal margin
//! 3. Otherwise the source mints a new token under its own lock and caches it
//! 4. A failed mint leaves the cache empty; the next call mints again

pub mod error;
pub mod pool;
pub mod source;

pub use error::{Error, Result};
pub use pool::{APP_SELECTED_METRIC, TokenPool};
pub use source::TokenSource;
