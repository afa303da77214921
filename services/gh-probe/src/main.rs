//! GitHub App token pool probe
//!
//! Single-binary tool that:
//! 1. Loads one or more GitHub App installations from TOML config
//! 2. Mints installation tokens on demand, rotating across apps
//! 3. Calls a GitHub API path through the rate-limit aware retry client
//! 4. Reports pool health and Prometheus metrics when done

mod config;
mod metrics;
mod probe;

use anyhow::{Context, Result, bail};
use github_auth::{InstallationMinter, USER_AGENT};
use github_http::RetryClient;
use github_pool::TokenPool;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

const DEFAULT_PATH: &str = "/rate_limit";

/// Command line arguments.
#[derive(Debug, PartialEq, Eq)]
struct Args {
    config: Option<String>,
    path: String,
    count: u32,
    print_metrics: bool,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self> {
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        let count = match value_of("--count") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("--count must be a positive integer, got {raw:?}"))?,
            None => 1,
        };
        if count == 0 {
            bail!("--count must be at least 1");
        }

        Ok(Self {
            config: value_of("--config"),
            path: value_of("--path").unwrap_or_else(|| DEFAULT_PATH.to_string()),
            count,
            print_metrics: args.iter().any(|a| a == "--metrics"),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting gh-probe");

    let metrics_handle = metrics::install_recorder();

    let args: Vec<String> = std::env::args().collect();
    let args = Args::parse(&args)?;

    let config_path = Config::resolve_path(args.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        api_url = %config.github.api_url,
        apps = config.apps.len(),
        "configuration loaded"
    );

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")?;

    let minter = Arc::new(InstallationMinter::new(
        client.clone(),
        config.github.api_url.clone(),
    ));
    let pool = TokenPool::from_configs(config.app_configs(), config.renewal_margin(), minter)
        .context("failed to build token pool")?;
    let retry_client = RetryClient::new(client, config.retry_policy());
    info!(
        max_attempts = retry_client.policy().max_attempts(),
        max_wait_secs = retry_client.policy().max_wait().as_secs(),
        "retry client ready"
    );

    let mut failures = 0u32;
    for attempt in 1..=args.count {
        match probe::probe(&pool, &retry_client, &config.github.api_url, &args.path).await {
            Ok(status) if (200..300).contains(&status) => {}
            Ok(status) => {
                error!(attempt, status, path = %args.path, "probe returned non-success status");
                failures += 1;
            }
            Err(e) => {
                error!(attempt, error = %format!("{e:#}"), "probe failed");
                failures += 1;
            }
        }
    }

    info!(health = %pool.health().await, "token pool health");

    if args.print_metrics {
        println!("{}", metrics_handle.render());
    }

    if failures > 0 {
        bail!("{failures} of {} probes failed", args.count);
    }

    info!(probes = args.count, "all probes succeeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        std::iter::once("gh-probe")
            .chain(items.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn args_default_to_rate_limit_once() {
        let args = Args::parse(&argv(&[])).unwrap();
        assert_eq!(
            args,
            Args {
                config: None,
                path: "/rate_limit".to_string(),
                count: 1,
                print_metrics: false,
            }
        );
    }

    #[test]
    fn args_parse_all_flags() {
        let args = Args::parse(&argv(&[
            "--config", "/etc/gh.toml", "--path", "/zen", "--count", "5", "--metrics",
        ]))
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("/etc/gh.toml"));
        assert_eq!(args.path, "/zen");
        assert_eq!(args.count, 5);
        assert!(args.print_metrics);
    }

    #[test]
    fn args_reject_bad_count() {
        assert!(Args::parse(&argv(&["--count", "zero"])).is_err());
        assert!(Args::parse(&argv(&["--count", "0"])).is_err());
        assert!(Args::parse(&argv(&["--count", "-3"])).is_err());
    }

    #[test]
    fn args_ignore_flag_without_value() {
        let args = Args::parse(&argv(&["--config"])).unwrap();
        assert_eq!(args.config, None);
    }
}
