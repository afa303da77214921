//! Per-app token cache with lazy renewal
//!
//! A `TokenSource` owns one app identity and its current installation token.
//! The cache lives behind a tokio `Mutex` that is held across the mint call,
//! so concurrent callers of the same source never mint twice: later callers
//! queue on the lock and observe whatever the in-flight mint produced.
//!
//! Sources share no state with each other; contention only happens between
//! callers of the same app.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use github_auth::{AppConfig, AppIdentity, Mint, Token};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

#[derive(Default)]
struct CachedToken {
    token: Option<Arc<Token>>,
    /// Most recent mint failure, tagged with its attempt number.
    last_failure: Option<(u64, github_auth::Error)>,
}

/// Caching token source for a single GitHub App installation.
pub struct TokenSource {
    identity: AppIdentity,
    renewal_margin: Duration,
    minter: Arc<dyn Mint>,
    cache: Mutex<CachedToken>,
    /// Completed mint attempts. Only written while `cache` is locked.
    mint_attempts: AtomicU64,
}

impl TokenSource {
    /// Create a source that discards its token `renewal_margin` before expiry.
    pub fn new(identity: AppIdentity, renewal_margin: Duration, minter: Arc<dyn Mint>) -> Self {
        info!(
            app_id = identity.app_id(),
            renewal_margin_secs = renewal_margin.as_secs(),
            "token source created, tokens are renewed ahead of expiry"
        );
        Self {
            identity,
            renewal_margin,
            minter,
            cache: Mutex::new(CachedToken::default()),
            mint_attempts: AtomicU64::new(0),
        }
    }

    /// Validate `config` and create a source for it.
    pub fn from_config(
        config: AppConfig,
        renewal_margin: Duration,
        minter: Arc<dyn Mint>,
    ) -> Result<Self> {
        let identity = AppIdentity::new(config).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self::new(identity, renewal_margin, minter))
    }

    /// Seed the cache with an already-known token.
    pub fn with_cached_token(mut self, token: Token) -> Self {
        self.cache.get_mut().token = Some(Arc::new(token));
        self
    }

    pub fn app_id(&self) -> &str {
        self.identity.app_id()
    }

    /// Return the cached token, minting a new one if it is missing or stale.
    ///
    /// A fresh cached token is returned as the same `Arc`. A failed mint
    /// leaves the cache empty and returns the mint error; callers that were
    /// already queued behind that mint receive the same error instead of
    /// minting again.
    pub async fn token(&self) -> Result<Arc<Token>> {
        let attempts_seen = self.mint_attempts.load(Ordering::Acquire);
        let mut cache = self.cache.lock().await;

        match cache.token.as_ref() {
            Some(token) if token.is_fresh(Utc::now(), self.renewal_margin) => {
                debug!(app_id = self.app_id(), "using cached installation token");
                return Ok(Arc::clone(token));
            }
            Some(token) if token.is_present() => {
                let expires_in_secs = token
                    .expires_at
                    .map(|at| (at - Utc::now()).num_seconds())
                    .unwrap_or_default();
                info!(
                    app_id = self.app_id(),
                    expires_in_secs, "installation token within renewal margin, renewing"
                );
            }
            _ => debug!(app_id = self.app_id(), "no valid installation token cached, minting"),
        }

        if let Some((attempt, err)) = &cache.last_failure {
            if *attempt > attempts_seen {
                debug!(
                    app_id = self.app_id(),
                    attempt, "reporting mint failure that completed while waiting"
                );
                return Err(Error::Mint(err.clone()));
            }
        }

        cache.token = None;
        let outcome = self.minter.mint(&self.identity).await;
        let attempt = self.mint_attempts.fetch_add(1, Ordering::AcqRel) + 1;

        match outcome {
            Ok(token) => {
                info!(
                    app_id = self.app_id(),
                    expires_at = ?token.expires_at,
                    "minted installation token"
                );
                let token = Arc::new(token);
                cache.token = Some(Arc::clone(&token));
                cache.last_failure = None;
                Ok(token)
            }
            Err(e) => {
                warn!(
                    app_id = self.app_id(),
                    attempt,
                    error = %e,
                    "installation token mint failed"
                );
                cache.last_failure = Some((attempt, e.clone()));
                Err(Error::Mint(e))
            }
        }
    }

    /// Cache state for health reporting.
    pub async fn status(&self) -> serde_json::Value {
        let cache = self.cache.lock().await;
        let fresh = cache
            .token
            .as_ref()
            .is_some_and(|t| t.is_fresh(Utc::now(), self.renewal_margin));
        serde_json::json!({
            "app_id": self.app_id(),
            "cached": cache.token.is_some(),
            "fresh": fresh,
            "expires_at": cache
                .token
                .as_ref()
                .and_then(|t| t.expires_at)
                .map(|at| at.to_rfc3339()),
            "last_error": cache.last_failure.as_ref().map(|(_, e)| e.to_string()),
        })
    }
}
