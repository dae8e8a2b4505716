//! Field inference from sample records
//!
//! Used by providers without a static schema for an object: the first page
//! of a collection is fetched and field types are guessed from the values.

use super::types::{FieldMetadata, ObjectMetadata, ValueType};
use crate::error::{Error, Result};
use crate::naming;
use crate::types::{JsonValue, Record};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static DATETIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").unwrap()
});

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Field inferrer with configuration options
#[derive(Debug, Clone)]
pub struct FieldInferrer {
    /// Detect date and date-time strings
    detect_dates: bool,
    /// Maximum number of records inspected
    max_samples: usize,
}

impl Default for FieldInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldInferrer {
    pub fn new() -> Self {
        Self {
            detect_dates: true,
            max_samples: 100,
        }
    }

    #[must_use]
    pub fn with_date_detection(mut self, enabled: bool) -> Self {
        self.detect_dates = enabled;
        self
    }

    #[must_use]
    pub fn with_max_samples(mut self, max: usize) -> Self {
        self.max_samples = max.max(1);
        self
    }

    /// Value type of a single JSON value, `None` for null
    pub fn value_type(&self, value: &JsonValue) -> Option<ValueType> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(_) => Some(ValueType::Boolean),
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => Some(ValueType::Int),
            JsonValue::Number(_) => Some(ValueType::Float),
            JsonValue::String(s) if self.detect_dates && DATETIME_REGEX.is_match(s) => {
                Some(ValueType::DateTime)
            }
            JsonValue::String(s) if self.detect_dates && DATE_REGEX.is_match(s) => {
                Some(ValueType::Date)
            }
            JsonValue::String(_) => Some(ValueType::String),
            JsonValue::Array(_) | JsonValue::Object(_) => Some(ValueType::Other),
        }
    }

    /// Merge the fields of every sampled record
    ///
    /// A field seen only as null is typed `Other`. Conflicting types widen
    /// (int and float to float), otherwise fall back to string.
    pub fn infer_fields(&self, records: &[Record]) -> BTreeMap<String, FieldMetadata> {
        let mut types: BTreeMap<String, (Option<ValueType>, &'static str)> = BTreeMap::new();

        for record in records.iter().take(self.max_samples) {
            for (name, value) in record {
                let observed = self.value_type(value);
                let entry = types
                    .entry(name.clone())
                    .or_insert((None, provider_type(value)));
                entry.0 = match (entry.0, observed) {
                    (Some(a), Some(b)) => Some(a.merge_with(b)),
                    (a, b) => a.or(b),
                };
                if entry.1 == "null" {
                    entry.1 = provider_type(value);
                }
            }
        }

        types
            .into_iter()
            .map(|(name, (value_type, provider))| {
                let field = FieldMetadata::new(
                    naming::display_name(&name),
                    value_type.unwrap_or(ValueType::Other),
                )
                .provider_type(provider);
                (name, field)
            })
            .collect()
    }

    /// Object metadata from a sample; an empty sample cannot describe anything
    pub fn infer_object(&self, object: &str, records: &[Record]) -> Result<ObjectMetadata> {
        if records.is_empty() {
            return Err(Error::missing_expected(format!(
                "no records returned for '{object}', cannot infer fields"
            )));
        }
        Ok(ObjectMetadata::from_fields(
            naming::display_name(object),
            self.infer_fields(records),
        ))
    }
}

/// Infer object metadata with default settings
pub fn infer_object_metadata(object: &str, records: &[Record]) -> Result<ObjectMetadata> {
    FieldInferrer::new().infer_object(object, records)
}

fn provider_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
