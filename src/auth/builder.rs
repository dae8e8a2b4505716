//! Credentials and authenticated client construction

use super::types::{AuthConfig, Location};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, JsonHttpClient};
use crate::types::AuthType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied credentials for a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    #[default]
    None,
    Basic {
        username: String,
        #[serde(default)]
        password: String,
    },
    Bearer {
        token: String,
    },
    ApiKey {
        #[serde(default)]
        location: Location,
        name: String,
        #[serde(default)]
        prefix: Option<String>,
        value: String,
    },
    Oauth2 {
        token_url: String,
        client_id: String,
        client_secret: String,
        refresh_token: String,
        #[serde(default)]
        access_token: Option<String>,
        #[serde(default)]
        expires_at: Option<DateTime<Utc>>,
        #[serde(default)]
        scopes: Vec<String>,
    },
    Oauth2ClientCredentials {
        token_url: String,
        client_id: String,
        client_secret: String,
        #[serde(default)]
        scopes: Vec<String>,
    },
}

impl Credentials {
    /// Scheme family these credentials belong to
    pub fn auth_type(&self) -> AuthType {
        match self {
            Credentials::None => AuthType::None,
            Credentials::Basic { .. } => AuthType::Basic,
            Credentials::ApiKey { .. } => AuthType::ApiKey,
            Credentials::Bearer { .. }
            | Credentials::Oauth2 { .. }
            | Credentials::Oauth2ClientCredentials { .. } => AuthType::Oauth2,
        }
    }

    /// Check that required fields are filled in
    pub fn validate(&self) -> Result<()> {
        let required: Vec<(&str, &str)> = match self {
            Credentials::None => vec![],
            Credentials::Basic { username, .. } => vec![("username", username.as_str())],
            Credentials::Bearer { token } => vec![("token", token.as_str())],
            Credentials::ApiKey { name, value, .. } => {
                vec![("name", name.as_str()), ("value", value.as_str())]
            }
            Credentials::Oauth2 {
                token_url,
                client_id,
                refresh_token,
                ..
            } => vec![
                ("token_url", token_url.as_str()),
                ("client_id", client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ],
            Credentials::Oauth2ClientCredentials {
                token_url,
                client_id,
                client_secret,
                ..
            } => vec![
                ("token_url", token_url.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ],
        };

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(Error::missing_param(format!("credentials.{field}"))),
            None => Ok(()),
        }
    }

    fn into_auth_config(self) -> AuthConfig {
        match self {
            Credentials::None => AuthConfig::None,
            Credentials::Basic { username, password } => AuthConfig::Basic { username, password },
            Credentials::Bearer { token } => AuthConfig::Bearer { token },
            Credentials::ApiKey {
                location,
                name,
                prefix,
                value,
            } => AuthConfig::ApiKey {
                location,
                name,
                prefix,
                value,
            },
            Credentials::Oauth2 {
                token_url,
                client_id,
                client_secret,
                refresh_token,
                access_token,
                expires_at,
                ..
            } => AuthConfig::Oauth2Refresh {
                token_url,
                client_id,
                client_secret,
                refresh_token,
                access_token,
                expires_at,
            },
            Credentials::Oauth2ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scopes,
            } => AuthConfig::Oauth2ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scopes,
            },
        }
    }
}

/// An HTTP client with authentication already wired in
///
/// Connectors receive this instead of raw credentials.
#[derive(Debug, Clone)]
pub struct AuthenticatedHttpClient {
    http: HttpClient,
    auth_type: AuthType,
}

impl AuthenticatedHttpClient {
    /// Transport client
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// JSON client over the transport
    pub fn json(&self) -> JsonHttpClient {
        JsonHttpClient::new(self.http.clone())
    }

    /// Scheme the client authenticates with
    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    /// Wrap an already configured client (tests, custom transports)
    pub fn from_http(http: HttpClient) -> Self {
        Self {
            http,
            auth_type: AuthType::None,
        }
    }
}

/// Builds an [`AuthenticatedHttpClient`] from credentials and client settings
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: HttpClientConfig,
    credentials: Credentials,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client settings (timeouts, retries, rate limit)
    #[must_use]
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn basic(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials(Credentials::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    #[must_use]
    pub fn bearer(self, token: impl Into<String>) -> Self {
        self.credentials(Credentials::Bearer {
            token: token.into(),
        })
    }

    /// API key sent in a header
    #[must_use]
    pub fn api_key_header(
        self,
        name: impl Into<String>,
        prefix: Option<&str>,
        value: impl Into<String>,
    ) -> Self {
        self.credentials(Credentials::ApiKey {
            location: Location::Header,
            name: name.into(),
            prefix: prefix.map(String::from),
            value: value.into(),
        })
    }

    /// API key sent as a query parameter
    #[must_use]
    pub fn api_key_query(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.credentials(Credentials::ApiKey {
            location: Location::Query,
            name: name.into(),
            prefix: None,
            value: value.into(),
        })
    }

    /// Validate credentials and build the client
    pub fn build(self) -> Result<AuthenticatedHttpClient> {
        self.credentials.validate()?;
        let auth_type = self.credentials.auth_type();
        let http = HttpClient::with_auth(self.config, self.credentials.into_auth_config())?;
        Ok(AuthenticatedHttpClient { http, auth_type })
    }
}
