//! Shared connector construction
//!
//! Every adapter starts from a [`ConnectorBase`]: the provider's registry
//! entry, the resolved module, the tenant's rendered base URL and the
//! authenticated client.

use crate::auth::AuthenticatedHttpClient;
use crate::error::{Error, Result};
use crate::http::JsonHttpClient;
use crate::providers::{provider_info, ModuleId, ModuleInfo, ProviderInfo};
use crate::urlbuilder::UrlBuilder;
use std::collections::BTreeMap;
use tracing::debug;

/// What a caller provides to build a connector
#[derive(Debug, Clone, Default)]
pub struct ConnectorParams {
    pub provider: String,
    pub module: ModuleId,
    pub workspace: Option<String>,
    /// Per-tenant values, available to base URL templates
    pub metadata: BTreeMap<String, String>,
    pub client: Option<AuthenticatedHttpClient>,
    /// Replaces the provider's base URL (proxies, mock servers)
    pub base_url: Option<String>,
}

impl ConnectorParams {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn module(mut self, module: impl Into<ModuleId>) -> Self {
        self.module = module.into();
        self
    }

    #[must_use]
    pub fn workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn client(mut self, client: AuthenticatedHttpClient) -> Self {
        self.client = Some(client);
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// Provider, module, tenant and client of a constructed connector
#[derive(Debug, Clone)]
pub struct ConnectorBase {
    provider: &'static ProviderInfo,
    module_id: ModuleId,
    module: ModuleInfo,
    base_url: String,
    workspace: Option<String>,
    metadata: BTreeMap<String, String>,
    client: AuthenticatedHttpClient,
}

impl ConnectorBase {
    /// Resolve the provider and module and render the base URL
    pub fn new(params: ConnectorParams) -> Result<Self> {
        let provider = provider_info(&params.provider)?;
        let module = provider.module(&params.module)?;
        let client = params
            .client
            .ok_or_else(|| Error::missing_param("client"))?;

        let base_url = match params.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => provider.render_base_url(params.workspace.as_deref(), &params.metadata)?,
        };

        debug!(
            provider = %provider.name,
            module = %params.module,
            base_url = %base_url,
            "Connector initialized"
        );

        Ok(Self {
            provider,
            module_id: params.module,
            module,
            base_url,
            workspace: params.workspace,
            metadata: params.metadata,
            client,
        })
    }

    pub fn provider(&self) -> &'static ProviderInfo {
        self.provider
    }

    pub fn provider_name(&self) -> &str {
        &self.provider.name
    }

    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    pub fn module(&self) -> &ModuleInfo {
        &self.module
    }

    /// Rendered base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn client(&self) -> &AuthenticatedHttpClient {
        &self.client
    }

    /// JSON client over the authenticated transport
    pub fn json(&self) -> JsonHttpClient {
        self.client.json()
    }

    /// Base URL joined with the module path
    pub fn module_url(&self) -> String {
        let path = self.module.path.trim_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// URL under the module path
    pub fn url(&self, parts: &[&str]) -> Result<UrlBuilder> {
        UrlBuilder::new(&self.module_url(), parts)
    }

    /// URL under the base URL, ignoring the module path
    pub fn root_url(&self, parts: &[&str]) -> Result<UrlBuilder> {
        UrlBuilder::new(&self.base_url, parts)
    }
}
