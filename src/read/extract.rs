//! Record extraction from response bodies

use crate::error::{Error, Result};
use crate::jsonquery::{records_from, JsonQuery};
use crate::types::{JsonValue, Record};
use std::fmt;
use std::sync::Arc;

/// Custom extraction function
pub type ExtractFn = Arc<dyn Fn(&JsonValue) -> Result<Vec<Record>> + Send + Sync>;

/// Where the records of a list response live
#[derive(Clone)]
pub enum RecordsExtractor {
    /// Array at a dotted path (`_results`, `data.items`)
    Path(String),
    /// The body itself is the array
    Root,
    /// Root array, or the first non-empty array of objects under a top-level key
    Auto,
    /// JSONPath selection; every match is one record
    JsonPath(String),
    Custom(ExtractFn),
}

impl RecordsExtractor {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&JsonValue) -> Result<Vec<Record>> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Records of a page; an empty body has none
    pub fn extract(&self, body: Option<&JsonValue>) -> Result<Vec<Record>> {
        let Some(body) = body else {
            return Ok(Vec::new());
        };

        match self {
            RecordsExtractor::Path(path) if path.is_empty() => root_records(body),
            RecordsExtractor::Path(path) => match JsonQuery::new(body).array_optional(path)? {
                Some(values) => records_from(values),
                None => Ok(Vec::new()),
            },
            RecordsExtractor::Root => root_records(body),
            RecordsExtractor::Auto => auto_records(body),
            RecordsExtractor::JsonPath(path) => records_from(&JsonQuery::new(body).select(path)?),
            RecordsExtractor::Custom(f) => f(body),
        }
    }
}

impl Default for RecordsExtractor {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Debug for RecordsExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Root => f.write_str("Root"),
            Self::Auto => f.write_str("Auto"),
            Self::JsonPath(path) => f.debug_tuple("JsonPath").field(path).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn root_records(body: &JsonValue) -> Result<Vec<Record>> {
    match body {
        JsonValue::Array(values) => records_from(values),
        other => Err(Error::unmarshal(format!(
            "expected a JSON array of records, got {}",
            json_kind(other)
        ))),
    }
}

fn auto_records(body: &JsonValue) -> Result<Vec<Record>> {
    match body {
        JsonValue::Array(values) => records_from(values),
        JsonValue::Object(fields) => {
            let array = fields.values().find_map(|value| match value {
                JsonValue::Array(items)
                    if !items.is_empty() && items.iter().all(JsonValue::is_object) =>
                {
                    Some(items)
                }
                _ => None,
            });
            match array {
                Some(items) => records_from(items),
                None => Ok(Vec::new()),
            }
        }
        _ => Ok(Vec::new()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
