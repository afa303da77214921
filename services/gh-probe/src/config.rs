//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Private keys are never stored in the TOML: each app names a PEM file or
//! an environment variable holding the key, resolved at load time.

use common::Secret;
use github_auth::{AppConfig, GITHUB_API_URL};
use github_http::{DEFAULT_MAX_RETRIES, MAX_RETRY_WAIT, RetryPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub apps: Vec<AppEntry>,
}

/// GitHub endpoint and token cache settings
#[derive(Debug, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Discard cached installation tokens this long before they expire
    #[serde(default = "default_renewal_margin_secs")]
    pub renewal_margin_secs: u64,
}

/// Retry budget for API requests
#[derive(Debug, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

/// One GitHub App installation
#[derive(Debug, Deserialize)]
pub struct AppEntry {
    pub app_id: String,
    pub installation_id: String,
    /// Path to the app's PEM private key
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,
    /// Name of an environment variable holding the PEM private key
    #[serde(default)]
    pub private_key_env: Option<String>,
    #[serde(skip)]
    pub private_key: Option<Secret<String>>,
}

fn default_api_url() -> String {
    GITHUB_API_URL.to_string()
}

fn default_renewal_margin_secs() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_max_wait_secs() -> u64 {
    MAX_RETRY_WAIT.as_secs()
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            renewal_margin_secs: default_renewal_margin_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and resolve every app's private key.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        for (idx, app) in config.apps.iter_mut().enumerate() {
            app.private_key = Some(resolve_private_key(idx, app)?);
        }

        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        let api_url = &self.github.api_url;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "api_url must start with http:// or https://, got: {}",
                self.github.api_url
            )));
        }

        if self.retry.max_wait_secs == 0 {
            return Err(common::Error::Config(
                "max_wait_secs must be greater than 0".into(),
            ));
        }

        if self.retry.max_wait_secs > MAX_RETRY_WAIT.as_secs() {
            return Err(common::Error::Config(format!(
                "max_wait_secs must be at most {}, got: {}",
                MAX_RETRY_WAIT.as_secs(),
                self.retry.max_wait_secs
            )));
        }

        if self.apps.is_empty() {
            return Err(common::Error::Config(
                "at least one [[apps]] entry is required".into(),
            ));
        }

        Ok(())
    }

    /// App credentials in config order, ready for the token pool.
    pub fn app_configs(&self) -> Vec<AppConfig> {
        self.apps
            .iter()
            .map(|app| {
                AppConfig::new(
                    app.app_id.clone(),
                    app.installation_id.clone(),
                    app.private_key
                        .clone()
                        .unwrap_or_else(|| Secret::new(String::new())),
                )
            })
            .collect()
    }

    pub fn renewal_margin(&self) -> Duration {
        Duration::from_secs(self.github.renewal_margin_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries,
            Duration::from_secs(self.retry.max_wait_secs),
        )
    }

    /// Resolve config file path from CLI arg or GH_PROBE_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("GH_PROBE_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("gh-probe.toml")
    }
}

/// Read an app's PEM key from its configured file or environment variable.
fn resolve_private_key(idx: usize, app: &AppEntry) -> common::Result<Secret<String>> {
    let key = match (&app.private_key_file, &app.private_key_env) {
        (Some(file), None) => std::fs::read_to_string(file).map_err(|e| {
            common::Error::Config(format!(
                "app index {idx}: failed to read private_key_file {}: {e}",
                file.display()
            ))
        })?,
        (None, Some(var)) => std::env::var(var).map_err(|_| {
            common::Error::Config(format!(
                "app index {idx}: environment variable {var} is not set"
            ))
        })?,
        (Some(_), Some(_)) => {
            return Err(common::Error::Config(format!(
                "app index {idx}: set only one of private_key_file or private_key_env"
            )));
        }
        (None, None) => {
            return Err(common::Error::Config(format!(
                "app index {idx}: private_key_file or private_key_env is required"
            )));
        }
    };

    let key = Secret::new(key);
    if key.is_blank() {
        return Err(common::Error::Config(format!(
            "app index {idx}: private key is empty"
        )));
    }
    Ok(key)
}
