//! Connector configuration
//!
//! A YAML or JSON document naming the provider and module, tenant details,
//! credentials and HTTP client settings. Files may reference environment
//! variables as `{{ env.NAME }}`; they are resolved when the file is loaded.

use crate::auth::{ClientBuilder, Credentials};
use crate::connector::ConnectorParams;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::providers::ModuleId;
use crate::template::{self, TemplateContext};
use crate::types::{BackoffType, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Connector Config
// ============================================================================

/// Everything needed to build one connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Provider name as listed in the provider registry (e.g., "hubspot")
    pub provider: String,

    /// Provider module; the root module when unset
    #[serde(default)]
    pub module: Option<String>,

    /// Tenant workspace (subdomain, instance name)
    #[serde(default)]
    pub workspace: Option<String>,

    /// Replaces the provider base URL (proxies, test servers)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Provider-specific settings
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub http: HttpConfig,
}

impl ConnectorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Module to use, defaulting to the root module
    pub fn module_id(&self) -> ModuleId {
        self.module
            .as_deref()
            .map_or_else(ModuleId::root, ModuleId::from)
    }

    /// Build the authenticated client and connector parameters
    pub fn connector_params(&self) -> Result<ConnectorParams> {
        let client = ClientBuilder::new()
            .http_config(self.http.client_config())
            .credentials(self.credentials.clone())
            .build()?;

        let mut params = ConnectorParams::new(&self.provider)
            .module(self.module_id())
            .client(client);
        if let Some(workspace) = &self.workspace {
            params = params.workspace(workspace);
        }
        if let Some(base_url) = &self.base_url {
            params = params.base_url(base_url);
        }
        for (key, value) in &self.metadata {
            params = params.metadata(key, value);
        }
        Ok(params)
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Retries for retryable failures; 0 disables retrying
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub backoff: BackoffType,

    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: None,
            max_retries: 0,
            backoff: BackoffType::default(),
            rate_limit: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

impl HttpConfig {
    /// Client configuration these settings describe
    pub fn client_config(&self) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_retries(self.max_retries)
            .backoff(self.backoff, defaults.initial_backoff, defaults.max_backoff);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(rate_limit) = &self.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        builder.build()
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Fill `{{ env.NAME }}` placeholders from the process environment
fn render_env(raw: &str) -> Result<String> {
    if !template::has_templates(raw) {
        return Ok(raw.to_string());
    }
    let env: serde_json::Map<String, JsonValue> = std::env::vars()
        .map(|(key, value)| (key, JsonValue::String(value)))
        .collect();
    let mut context = TemplateContext::new();
    context.set_vars(serde_json::json!({ "env": env }));
    template::render(raw, &context)
}

/// Load a config file; `.json` files are parsed as JSON, anything else as YAML
pub fn load_config(path: impl AsRef<Path>) -> Result<ConnectorConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
    let rendered = render_env(&raw)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        ConnectorConfig::from_json_str(&rendered)?
    } else {
        ConnectorConfig::from_yaml_str(&rendered)?
    };
    debug!(path = %path.display(), provider = %config.provider, "Loaded connector config");
    Ok(config)
}
