//! Authenticator implementation
//!
//! Handles applying authentication to requests and managing token refresh.

use super::types::{AuthConfig, CachedToken, Location};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for OAuth2 auth
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    ///
    /// A refresh-token config carrying an access token seeds the cache, so no
    /// refresh happens until that token expires.
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        let seed = match &config {
            AuthConfig::Oauth2Refresh {
                access_token: Some(token),
                expires_at,
                ..
            } => Some(CachedToken::new(token.clone(), *expires_at)),
            _ => None,
        };

        Self {
            config,
            cached_token: Arc::new(RwLock::new(seed)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),

            AuthConfig::ApiKey {
                location,
                name,
                prefix,
                value,
            } => {
                let val = format!("{}{}", prefix.as_deref().unwrap_or(""), value);
                match location {
                    Location::Header => Ok(req.header(name.as_str(), val)),
                    Location::Query => Ok(req.query(&[(name.as_str(), val)])),
                }
            }

            AuthConfig::Basic { username, password } => {
                Ok(req.basic_auth(username, Some(password)))
            }

            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),

            AuthConfig::Oauth2ClientCredentials { .. } | AuthConfig::Oauth2Refresh { .. } => {
                let token = self.get_or_refresh_token().await?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    /// Get a valid token, refreshing if necessary
    async fn get_or_refresh_token(&self) -> Result<String> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        // Need to refresh - acquire write lock
        let mut cached = self.cached_token.write().await;

        // Double-check after acquiring write lock (another task might have refreshed)
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let rotated = cached.as_ref().and_then(|t| t.refresh_token.clone());
        let new_token = self.fetch_new_token(rotated.as_deref()).await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch a new token based on auth type
    async fn fetch_new_token(&self, rotated_refresh: Option<&str>) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::Oauth2ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scopes,
            } => {
                self.fetch_oauth2_client_credentials(token_url, client_id, client_secret, scopes)
                    .await
            }

            AuthConfig::Oauth2Refresh {
                token_url,
                client_id,
                client_secret,
                refresh_token,
                ..
            } => {
                let refresh_token = rotated_refresh.unwrap_or(refresh_token);
                self.fetch_oauth2_refresh(token_url, client_id, client_secret, refresh_token)
                    .await
            }

            _ => Err(Error::auth(
                "Token refresh not supported for this auth type",
            )),
        }
    }

    /// Fetch OAuth2 token using client credentials flow
    async fn fetch_oauth2_client_credentials(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        scopes: &[String],
    ) -> Result<CachedToken> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
        ];

        if !scopes.is_empty() {
            form.push(("scope", scopes.join(" ")));
        }

        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::OAuth2 {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        debug!(token_url, "Obtained client credentials token");
        Ok(token_response.into_cached_token())
    }

    /// Fetch OAuth2 token using refresh token flow
    async fn fetch_oauth2_refresh(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<CachedToken> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Refresh token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        debug!(token_url, "Refreshed access token");
        Ok(token_response.into_cached_token())
    }

    /// Clear the cached token (useful for testing or forced refresh)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        let mut token = match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token, None),
        };
        token.refresh_token = self.refresh_token;
        token
    }
}
