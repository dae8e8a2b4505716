//! Endpoint support matrix
//!
//! Each module lists endpoint patterns with the operations they support.
//! Patterns are brace-expanded (`{contacts,companies}`) into object names
//! and may contain `*` wildcards. Any object without a matching pattern
//! supports nothing.

use crate::error::{Error, Result};
use crate::providers::ModuleId;
use crate::types::Operation;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Operations supported by an endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Support {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
    pub subscribe: bool,
}

impl Support {
    pub const NONE: Support = Support {
        read: false,
        write: false,
        delete: false,
        subscribe: false,
    };
    pub const READ: Support = Support {
        read: true,
        ..Self::NONE
    };
    pub const WRITE: Support = Support {
        write: true,
        ..Self::NONE
    };
    pub const DELETE: Support = Support {
        delete: true,
        ..Self::NONE
    };
    pub const SUBSCRIBE: Support = Support {
        subscribe: true,
        ..Self::NONE
    };
    pub const ALL: Support = Support {
        read: true,
        write: true,
        delete: true,
        subscribe: true,
    };

    #[must_use]
    pub const fn union(self, other: Support) -> Support {
        Support {
            read: self.read || other.read,
            write: self.write || other.write,
            delete: self.delete || other.delete,
            subscribe: self.subscribe || other.subscribe,
        }
    }

    pub fn supports(&self, operation: Operation) -> bool {
        match operation {
            Operation::Read => self.read,
            Operation::Write => self.write,
            Operation::Delete => self.delete,
            Operation::Subscribe => self.subscribe,
        }
    }
}

/// One pattern with its support
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSupport {
    pub endpoint: String,
    pub support: Support,
}

impl EndpointSupport {
    pub fn new(endpoint: impl Into<String>, support: Support) -> Self {
        Self {
            endpoint: endpoint.into(),
            support,
        }
    }
}

/// Registry input: patterns per module
pub type EndpointRegistryInput = BTreeMap<ModuleId, Vec<EndpointSupport>>;

#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    Glob(String, Regex),
}

impl Matcher {
    fn compile(name: &str) -> Result<Self> {
        if !name.contains('*') {
            return Ok(Matcher::Exact(name.to_string()));
        }
        let pattern = name
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Regex::new(&format!("^{pattern}$"))
            .map(|re| Matcher::Glob(name.to_string(), re))
            .map_err(|e| Error::config(format!("invalid endpoint pattern '{name}': {e}")))
    }

    fn matches(&self, object: &str) -> bool {
        match self {
            Matcher::Exact(name) => name == object,
            Matcher::Glob(_, re) => re.is_match(object),
        }
    }

    fn pattern(&self) -> &str {
        match self {
            Matcher::Exact(name) | Matcher::Glob(name, _) => name,
        }
    }
}

/// Answers whether a module's object supports an operation
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    modules: HashMap<ModuleId, Vec<(Matcher, Support)>>,
}

impl EndpointRegistry {
    /// Expand and compile every pattern
    pub fn new(input: EndpointRegistryInput) -> Result<Self> {
        let mut modules = HashMap::new();
        for (module, endpoints) in input {
            let mut compiled = Vec::new();
            for endpoint in endpoints {
                for name in expand_braces(&endpoint.endpoint)? {
                    compiled.push((Matcher::compile(&name)?, endpoint.support));
                }
            }
            modules.insert(module, compiled);
        }
        Ok(Self { modules })
    }

    /// Registry for a provider with only the root module
    pub fn root(endpoints: Vec<EndpointSupport>) -> Result<Self> {
        Self::new(BTreeMap::from([(ModuleId::root(), endpoints)]))
    }

    /// Combined support of every pattern matching the object
    pub fn support(&self, module: &ModuleId, object: &str) -> Support {
        self.modules
            .get(module)
            .into_iter()
            .flatten()
            .filter(|(matcher, _)| matcher.matches(object))
            .fold(Support::NONE, |acc, (_, support)| acc.union(*support))
    }

    /// Declared object names (or `*` patterns) of a module with their support
    pub fn objects(&self, module: &ModuleId) -> BTreeMap<String, Support> {
        let mut objects = BTreeMap::new();
        for (matcher, support) in self.modules.get(module).into_iter().flatten() {
            let entry = objects
                .entry(matcher.pattern().to_string())
                .or_insert(Support::NONE);
            *entry = entry.union(*support);
        }
        objects
    }

    pub fn is_supported(&self, module: &ModuleId, object: &str, operation: Operation) -> bool {
        self.support(module, object).supports(operation)
    }

    /// Fail with `OperationNotSupportedForObject` when unsupported
    pub fn check(&self, module: &ModuleId, object: &str, operation: Operation) -> Result<()> {
        if self.is_supported(module, object, operation) {
            Ok(())
        } else {
            Err(Error::operation_not_supported(operation, object))
        }
    }
}

/// Expand `{a,b}` groups into every combination
///
/// Groups may nest and repeat: `{a,b}-{x,y}` yields four names.
pub fn expand_braces(pattern: &str) -> Result<Vec<String>> {
    let Some(open) = pattern.find('{') else {
        if pattern.contains('}') {
            return Err(unbalanced(pattern));
        }
        return Ok(vec![pattern.to_string()]);
    };

    let mut depth = 0;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, ch) in pattern[open..].char_indices() {
        let at = open + i;
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(at);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(at),
            _ => {}
        }
    }
    let close = close.ok_or_else(|| unbalanced(pattern))?;

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    let mut expanded = Vec::new();
    for window in bounds.windows(2) {
        let alternative = &pattern[window[0] + 1..window[1]];
        expanded.extend(expand_braces(&format!("{prefix}{alternative}{suffix}"))?);
    }
    Ok(expanded)
}

fn unbalanced(pattern: &str) -> Error {
    Error::config(format!("unbalanced braces in endpoint pattern '{pattern}'"))
}
