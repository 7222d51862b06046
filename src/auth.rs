// ABOUTME: OAuth client-credentials token exchange
// ABOUTME: Produces the bearer token used for every pipeline API call

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::fmt;
use std::time::Duration;

use crate::error::LifecycleError;
use crate::remote::models::TokenResponse;

/// Audience the pipeline API expects in issued tokens.
pub const API_AUDIENCE: &str = "https://api.privacydynamics.io";

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire_token(
        &self,
        domain: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken>;
}

pub struct OAuthClient {
    client: Client,
}

impl OAuthClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

/// Bare hosts get `https://`; a domain that already names a scheme is kept.
pub fn token_url(domain: &str) -> String {
    let domain = domain.trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        format!("{}/oauth/token", domain)
    } else {
        format!("https://{}/oauth/token", domain)
    }
}

#[async_trait]
impl CredentialProvider for OAuthClient {
    async fn acquire_token(
        &self,
        domain: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken> {
        let url = token_url(domain);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "grant_type": "client_credentials",
                "client_id": client_id,
                "client_secret": client_secret,
                "audience": API_AUDIENCE,
            }))
            .send()
            .await
            .with_context(|| format!("Failed to reach token endpoint {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Token exchange failed with status {}: {}. Check client-id and client-secret",
                status,
                body
            );
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        Ok(AccessToken::new(token.access_token))
    }
}

/// Runs the token exchange and maps any failure to `LifecycleError::Auth`.
pub async fn authenticate(
    provider: &dyn CredentialProvider,
    domain: &str,
    client_id: &str,
    client_secret: &str,
) -> std::result::Result<AccessToken, LifecycleError> {
    tracing::info!("Requesting access token from {}", domain);
    provider
        .acquire_token(domain, client_id, client_secret)
        .await
        .map_err(|e| LifecycleError::Auth(LifecycleError::reason(&e)))
}
