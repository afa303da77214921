//! Installation access tokens and the mint seam
//!
//! `Mint` abstracts "produce a fresh token for this identity". The production
//! implementation, `InstallationMinter`, signs an app JWT and exchanges it at
//! `POST /app/installations/{installation_id}/access_tokens`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use common::Secret;
use serde::Deserialize;
use tracing::debug;

use crate::constants::{GITHUB_ACCEPT, GITHUB_API_VERSION, INSTALLATION_TOKEN_TYPE, USER_AGENT};
use crate::error::{Error, Result};
use crate::identity::AppIdentity;
use crate::jwt::generate_app_jwt;

/// An access token as cached by a token source.
///
/// `expires_at` of `None` means the token does not expire.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: Secret<String>,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            token_type: token_type.into(),
            expires_at,
        }
    }

    /// True when the token carries a non-empty access token.
    pub fn is_present(&self) -> bool {
        !self.access_token.expose().is_empty()
    }

    /// True when the token is present and expires more than `margin` after `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        if !self.is_present() {
            return false;
        }
        let Some(expires_at) = self.expires_at else {
            return true;
        };
        let margin = TimeDelta::from_std(margin).unwrap_or(TimeDelta::MAX);
        match expires_at.checked_sub_signed(margin) {
            Some(renew_at) => renew_at > now,
            None => false,
        }
    }

    /// Value for the `Authorization` header, e.g. `token ghs_...`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose())
    }
}

/// Boxed future returned by `Mint::mint`.
pub type MintFuture<'a> = Pin<Box<dyn Future<Output = Result<Token>> + Send + 'a>>;

/// Produces a fresh access token for an identity.
///
/// Implementations must be safe to call repeatedly; errors are handed to the
/// caller unchanged.
pub trait Mint: Send + Sync {
    fn mint<'a>(&'a self, identity: &'a AppIdentity) -> MintFuture<'a>;
}

/// Response body of the installation access token endpoint.
#[derive(Debug, Deserialize)]
pub struct InstallationTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints installation access tokens against the GitHub REST API.
#[derive(Debug, Clone)]
pub struct InstallationMinter {
    client: reqwest::Client,
    api_url: String,
}

impl InstallationMinter {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    fn access_tokens_url(&self, identity: &AppIdentity) -> String {
        format!(
            "{}/app/installations/{}/access_tokens",
            self.api_url.trim_end_matches('/'),
            identity.installation_id()
        )
    }

    /// Exchange a freshly signed app JWT for an installation access token.
    pub async fn create_installation_token(&self, identity: &AppIdentity) -> Result<Token> {
        let jwt = generate_app_jwt(identity, Utc::now())?;
        let url = self.access_tokens_url(identity);
        debug!(app_id = identity.app_id(), url = %url, "requesting installation token");

        let response = self
            .client
            .post(&url)
            .bearer_auth(jwt)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await
            .map_err(|e| Error::Http(format!("installation token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));

            // 401: bad JWT, 403/404: app not installed or installation revoked
            if matches!(status.as_u16(), 401 | 403 | 404) {
                return Err(Error::InvalidCredentials(format!(
                    "app {} rejected ({status}): {body}",
                    identity.app_id()
                )));
            }

            return Err(Error::TokenExchange(format!(
                "installation token endpoint returned {status}: {body}"
            )));
        }

        let body = response
            .json::<InstallationTokenResponse>()
            .await
            .map_err(|e| {
                Error::TokenExchange(format!("invalid installation token response: {e}"))
            })?;

        Ok(Token::new(
            body.token,
            INSTALLATION_TOKEN_TYPE,
            Some(body.expires_at),
        ))
    }
}

impl Mint for InstallationMinter {
    fn mint<'a>(&'a self, identity: &'a AppIdentity) -> MintFuture<'a> {
        Box::pin(self.create_installation_token(identity))
    }
}
