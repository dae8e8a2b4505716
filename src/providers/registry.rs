//! Embedded provider registry

use super::info::ProviderInfo;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

#[derive(Deserialize)]
struct RegistryFile {
    providers: Vec<ProviderInfo>,
}

/// Parsed registry, or the parse failure message
static REGISTRY: LazyLock<std::result::Result<BTreeMap<String, ProviderInfo>, String>> =
    LazyLock::new(|| {
        let file: RegistryFile =
            serde_json::from_str(include_str!("../../providers/registry.json"))
                .map_err(|e| format!("invalid provider registry: {e}"))?;
        Ok(file
            .providers
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect())
    });

fn registry() -> Result<&'static BTreeMap<String, ProviderInfo>> {
    REGISTRY.as_ref().map_err(|message| Error::config(message.clone()))
}

/// Look up a provider by name
pub fn provider_info(name: &str) -> Result<&'static ProviderInfo> {
    registry()?
        .get(name)
        .ok_or_else(|| Error::UnknownProvider {
            provider: name.to_string(),
        })
}

/// All registered providers, sorted by name
pub fn providers() -> Result<Vec<&'static ProviderInfo>> {
    Ok(registry()?.values().collect())
}
