//! Authenticated GitHub API probe
//!
//! Takes a token from the pool, builds the request, and runs it through the
//! retry client. This is the only place the two halves meet.

use anyhow::{Context, Result};
use github_auth::{GITHUB_ACCEPT, GITHUB_API_VERSION, Token};
use github_http::{RetryClient, Transport, is_retryable};
use github_pool::TokenPool;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderName, HeaderValue};
use reqwest::{Method, Request, Url};
use std::time::Instant;
use tracing::{info, warn};

use crate::metrics;

/// Build `GET {api_url}/{path}` authenticated with `token`.
pub fn build_request(api_url: &str, path: &str, token: &Token) -> Result<Request> {
    let raw = format!(
        "{}/{}",
        api_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let url = Url::parse(&raw).with_context(|| format!("invalid request url: {raw}"))?;

    let mut authorization = HeaderValue::from_str(&token.authorization())
        .context("installation token is not a valid header value")?;
    authorization.set_sensitive(true);

    let mut request = Request::new(Method::GET, url);
    let headers = request.headers_mut();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
    headers.insert(
        HeaderName::from_static("x-github-api-version"),
        HeaderValue::from_static(GITHUB_API_VERSION),
    );
    Ok(request)
}

/// Issue one probe request and return the final status code.
pub async fn probe<T: Transport>(
    pool: &TokenPool,
    client: &RetryClient<T>,
    api_url: &str,
    path: &str,
) -> Result<u16> {
    let started = Instant::now();
    let token = pool
        .token()
        .await
        .context("failed to obtain installation token")?;
    let request = build_request(api_url, path, &token)?;

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            metrics::record_request("error", started.elapsed().as_secs_f64());
            return Err(e).context("github request failed");
        }
    };

    let status = response.status().as_u16();
    metrics::record_request(&status.to_string(), started.elapsed().as_secs_f64());

    if is_retryable(status) {
        warn!(status, path, "github still failing after retries");
    } else {
        info!(status, path, elapsed_ms = started.elapsed().as_millis() as u64, "probe completed");
    }
    Ok(status)
}
