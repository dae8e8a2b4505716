//! HTTP client with error classification, rate limiting and opt-in retries
//!
//! Provides the transport layer every connector talks through:
//! - Method helpers taking a URL, optional body and per-call headers
//! - A `should_handle_error` predicate deciding which responses are errors
//! - An [`ErrorInterpreter`] turning those responses into typed errors
//! - Optional token-bucket rate limiting
//! - Retries with configurable backoff, disabled unless `max_retries > 0`

use super::interpreter::{DefaultInterpreter, ErrorInterpreter};
use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::Result;
use crate::types::{BackoffType, JsonValue, Method};
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries (0 disables retrying)
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("solidafy-connectors/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Request body variants
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(JsonValue),
    /// Pre-encoded `application/x-www-form-urlencoded` body
    Form(String),
    Raw {
        content_type: String,
        bytes: Bytes,
    },
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Option<RequestBody>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Set an encoded form body
    #[must_use]
    pub fn form(mut self, encoded: String) -> Self {
        self.body = Some(RequestBody::Form(encoded));
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub url: Url,
}

impl HttpResponse {
    /// Numeric status code
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text (lossy UTF-8)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Decides whether a response goes through the error interpreter
pub type ErrorPredicate = Arc<dyn Fn(&HttpResponse) -> bool + Send + Sync>;

/// Default predicate: every non-2xx response is an error
pub fn non_success() -> ErrorPredicate {
    Arc::new(|response: &HttpResponse| !response.is_success())
}

/// HTTP client shared by connectors
///
/// Cloning is cheap; clones share the connection pool, authenticator and
/// rate limiter.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<HttpClientConfig>,
    authenticator: Option<Arc<Authenticator>>,
    rate_limiter: Option<RateLimiter>,
    should_handle_error: ErrorPredicate,
    interpreter: Arc<dyn ErrorInterpreter>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config: Arc::new(config),
            authenticator: None,
            rate_limiter,
            should_handle_error: non_success(),
            interpreter: Arc::new(DefaultInterpreter::new()),
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.set_authenticator(auth_config);
        Ok(client)
    }

    /// Set the authenticator
    pub fn set_authenticator(&mut self, auth_config: AuthConfig) {
        self.authenticator = Some(Arc::new(Authenticator::with_client(
            auth_config,
            self.client.clone(),
        )));
    }

    /// Replace the predicate deciding which responses are errors
    #[must_use]
    pub fn with_error_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&HttpResponse) -> bool + Send + Sync + 'static,
    {
        self.should_handle_error = Arc::new(predicate);
        self
    }

    /// Replace the error interpreter
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl ErrorInterpreter + 'static) -> Self {
        self.interpreter = Arc::new(interpreter);
        self
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.request(Method::GET, url, RequestConfig::default())
            .await
    }

    /// Make a POST request with a JSON body
    pub async fn post(&self, url: &str, body: JsonValue) -> Result<HttpResponse> {
        self.request(Method::POST, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, body: JsonValue) -> Result<HttpResponse> {
        self.request(Method::PUT, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch(&self, url: &str, body: JsonValue) -> Result<HttpResponse> {
        self.request(Method::PATCH, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<HttpResponse> {
        self.request(Method::DELETE, url, RequestConfig::default())
            .await
    }

    /// Make a generic request
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        let parsed_url = Url::parse(url)?;
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            let outcome = self.send_once(method, &parsed_url, &config).await;

            let err = match outcome {
                Ok(response) => {
                    if !(self.should_handle_error)(&response) {
                        debug!(
                            method = %method,
                            url = %parsed_url,
                            status = response.code(),
                            "Request succeeded"
                        );
                        return Ok(response);
                    }
                    match self.interpreter.interpret(&response) {
                        Some(err) => err,
                        None => return Ok(response),
                    }
                }
                Err(err) => err,
            };

            if attempt >= max_retries || !err.is_retryable() {
                debug!(method = %method, url = %parsed_url, error = %err, "Request failed");
                return Err(err);
            }

            let delay = err
                .retry_after()
                .unwrap_or_else(|| self.calculate_backoff(attempt));
            warn!(
                method = %method,
                url = %parsed_url,
                attempt = attempt + 1,
                max_attempts = max_retries + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        config: &RequestConfig,
    ) -> Result<HttpResponse> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self.client.request(method.into(), url.clone());

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        match &config.body {
            Some(RequestBody::Json(body)) => {
                if !config.has_header(CONTENT_TYPE.as_str()) {
                    req = req.header(CONTENT_TYPE, "application/json");
                }
                req = req.body(serde_json::to_vec(body)?);
            }
            Some(RequestBody::Form(encoded)) => {
                req = req
                    .header(CONTENT_TYPE, crate::codec::FORM_CONTENT_TYPE)
                    .body(encoded.clone());
            }
            Some(RequestBody::Raw {
                content_type,
                bytes,
            }) => {
                req = req
                    .header(CONTENT_TYPE, content_type.as_str())
                    .body(bytes.clone());
            }
            None => {}
        }

        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(timeout) = config.timeout {
            req = req.timeout(timeout);
        }

        if let Some(ref auth) = self.authenticator {
            req = auth.apply(req).await?;
        }

        let response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
            url: final_url,
        })
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
