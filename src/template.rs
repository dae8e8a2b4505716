//! Template interpolation for provider URLs
//!
//! Handles `{{ variable }}` interpolation in provider base URLs and module
//! paths. Supports `{{ workspace }}` and nested access like
//! `{{ metadata.instance }}`.

use crate::error::{Error, Result};
use crate::types::{scalar_to_string, JsonValue};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap()
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Tenant workspace (subdomain, instance name, project id)
    pub workspace: Option<String>,
    /// Per-tenant metadata values
    pub metadata: BTreeMap<String, String>,
    /// Additional context variables
    pub vars: JsonValue,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workspace
    pub fn set_workspace(&mut self, workspace: impl Into<String>) -> &mut Self {
        self.workspace = Some(workspace.into());
        self
    }

    /// Set metadata values
    pub fn set_metadata(&mut self, metadata: BTreeMap<String, String>) -> &mut Self {
        self.metadata = metadata;
        self
    }

    /// Set additional variables
    pub fn set_vars(&mut self, vars: JsonValue) -> &mut Self {
        self.vars = vars;
        self
    }

    /// Get a value by path (e.g., "metadata.instance")
    pub fn get(&self, path: &str) -> Option<String> {
        let (root, rest) = match path.split_once('.') {
            Some((root, rest)) => (root, Some(rest)),
            None => (path, None),
        };

        match (root, rest) {
            ("workspace", None) => self.workspace.clone(),
            ("metadata", Some(key)) => self.metadata.get(key).cloned(),
            _ => {
                let mut current = &self.vars;
                for part in path.split('.') {
                    current = current.as_object()?.get(part)?;
                }
                scalar_to_string(current)
            }
        }
    }
}

/// Render a template string with the given context
///
/// Every variable must resolve; the error names all undefined ones.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &Captures<'_>| {
        let var_path = &cap[1];
        match ctx.get(var_path) {
            Some(value) => value,
            None => {
                missing.push(var_path.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}
