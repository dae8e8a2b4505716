//! Auth configuration types
//!
//! These types represent the runtime auth configuration a client applies to
//! every request. Caller-facing credentials are converted into them by the
//! [`ClientBuilder`](super::ClientBuilder).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location for API key placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Place in HTTP header
    #[default]
    Header,
    /// Place in query parameter
    Query,
}

/// Authentication applied to outgoing requests
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// API Key authentication (header or query)
    ApiKey {
        /// Where to place the API key
        location: Location,
        /// Header or query parameter name
        name: String,
        /// Prefix to add before the value (e.g., "Bearer ")
        prefix: Option<String>,
        /// The API key value
        value: String,
    },

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },

    /// OAuth2 Client Credentials flow
    Oauth2ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Requested scopes
        scopes: Vec<String>,
    },

    /// OAuth2 Refresh Token flow
    Oauth2Refresh {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Refresh token
        refresh_token: String,
        /// Access token already issued, used until it expires
        access_token: Option<String>,
        /// Expiry of `access_token`
        expires_at: Option<DateTime<Utc>>,
    },
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Rotated refresh token returned alongside the access token
    pub refresh_token: Option<String>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token,
            expires_at,
            refresh_token: None,
        }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self::new(token, Some(expires_at))
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false, // No expiration = never expires
        }
    }
}
