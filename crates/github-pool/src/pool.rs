//! Round-robin selection across token sources
//!
//! The pool holds a fixed, non-empty list of sources and an `AtomicUsize`
//! cursor. Every call advances the cursor exactly once and serves the request
//! from `sources[cursor % len]`, which spreads load evenly without any
//! coordination between processes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use github_auth::{AppConfig, Mint, Token};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::source::TokenSource;

/// Counter incremented once per selection, labelled with `app_idx`.
pub const APP_SELECTED_METRIC: &str = "token_app_selected";

/// Fixed set of token sources with round-robin selection.
pub struct TokenPool {
    sources: Vec<TokenSource>,
    next_index: AtomicUsize,
}

impl TokenPool {
    /// Create a pool over `sources`. Fails if `sources` is empty.
    pub fn new(sources: Vec<TokenSource>) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::Config(
                "at least one token source must be provided".into(),
            ));
        }
        info!(apps = sources.len(), "token pool initialized");
        Ok(Self {
            sources,
            next_index: AtomicUsize::new(0),
        })
    }

    /// Create one source per app config and pool them.
    ///
    /// Fails if `configs` is empty or any config is invalid; the error names
    /// the offending index and app id.
    pub fn from_configs(
        configs: Vec<AppConfig>,
        renewal_margin: Duration,
        minter: Arc<dyn Mint>,
    ) -> Result<Self> {
        if configs.is_empty() {
            return Err(Error::Config(
                "at least one app config must be provided".into(),
            ));
        }

        let mut sources = Vec::with_capacity(configs.len());
        for (idx, config) in configs.into_iter().enumerate() {
            let app_id = config.app_id.clone();
            let source = TokenSource::from_config(config, renewal_margin, Arc::clone(&minter))
                .map_err(|e| {
                    Error::Config(format!(
                        "failed to create token source for app index {idx} (app_id={app_id}): {e}"
                    ))
                })?;
            sources.push(source);
        }

        Self::new(sources)
    }

    /// Get a token from the next source in round-robin order.
    ///
    /// The selected source's result is returned unchanged, errors included.
    pub async fn token(&self) -> Result<Arc<Token>> {
        let idx = self.select();
        let source = &self.sources[idx];
        metrics::counter!(APP_SELECTED_METRIC, "app_idx" => idx.to_string()).increment(1);
        debug!(app_idx = idx, app_id = source.app_id(), "selected token source");
        source.token().await
    }

    /// Advance the cursor and return the index to serve this call.
    fn select(&self) -> usize {
        let n = self.sources.len();
        let call = self.next_index.fetch_add(1, Ordering::Relaxed);
        if n == 1 { 0 } else { call % n }
    }

    /// Number of sources; fixed at construction.
    pub fn size(&self) -> usize {
        self.sources.len()
    }

    /// Total selections made so far.
    pub fn selections(&self) -> usize {
        self.next_index.load(Ordering::Relaxed)
    }

    /// Per-source cache state for logging and health checks.
    pub async fn health(&self) -> serde_json::Value {
        let mut apps = Vec::with_capacity(self.sources.len());
        let mut fresh = 0usize;
        for (idx, source) in self.sources.iter().enumerate() {
            let mut status = source.status().await;
            if status["fresh"] == true {
                fresh += 1;
            }
            status["app_idx"] = idx.into();
            apps.push(status);
        }
        serde_json::json!({
            "apps_total": self.sources.len(),
            "apps_fresh": fresh,
            "selections": self.selections(),
            "apps": apps,
        })
    }
}
