//! Provider and module descriptors

use crate::error::{Error, Result};
use crate::template::{render, TemplateContext};
use crate::types::AuthType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a provider module
///
/// The empty id and `"root"` are the same module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModuleId(String);

impl ModuleId {
    /// Canonical name of the default module
    pub const ROOT: &'static str = "root";

    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref().trim();
        if id.is_empty() {
            Self::root()
        } else {
            Self(id.to_string())
        }
    }

    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self::root()
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A provider sub-namespace with its own URL prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub label: String,
    /// Path appended to the provider base URL, may be empty
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub version: String,
}

/// Registry entry for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub name: String,
    pub display_name: String,
    /// Base URL, possibly containing `{{ workspace }}` or `{{ metadata.<key> }}`
    pub base_url: String,
    pub auth_type: AuthType,
    #[serde(default)]
    pub modules: BTreeMap<ModuleId, ModuleInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,
    #[serde(default)]
    pub workspace_required: bool,
}

impl ProviderInfo {
    /// Resolve a module, canonicalizing the empty id to root
    ///
    /// Providers without declared modules only know the root module, which
    /// then has no path prefix.
    pub fn module(&self, id: &ModuleId) -> Result<ModuleInfo> {
        if let Some(info) = self.modules.get(id) {
            return Ok(info.clone());
        }
        if self.modules.is_empty() && id.is_root() {
            return Ok(ModuleInfo {
                label: self.display_name.clone(),
                path: String::new(),
                version: String::new(),
            });
        }
        Err(Error::UnsupportedModule {
            module: id.to_string(),
        })
    }

    /// Render the base URL for a tenant
    pub fn render_base_url(
        &self,
        workspace: Option<&str>,
        metadata: &BTreeMap<String, String>,
    ) -> Result<String> {
        let workspace = workspace.map(str::trim).filter(|w| !w.is_empty());
        if self.workspace_required && workspace.is_none() {
            return Err(Error::missing_param("workspace"));
        }

        let mut ctx = TemplateContext::new();
        if let Some(workspace) = workspace {
            ctx.set_workspace(workspace);
        }
        ctx.set_metadata(metadata.clone());

        let url = render(&self.base_url, &ctx)?;
        Ok(url.trim_end_matches('/').to_string())
    }
}
