//! Typed lookups over a JSON tree

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Record};
use jsonpath_rust::JsonPath;

/// Read-only query view over a JSON value
#[derive(Debug, Clone, Copy)]
pub struct JsonQuery<'a> {
    root: &'a JsonValue,
}

impl<'a> JsonQuery<'a> {
    /// Wrap a parsed JSON value
    pub fn new(root: &'a JsonValue) -> Self {
        Self { root }
    }

    /// The wrapped value
    pub fn root(&self) -> &'a JsonValue {
        self.root
    }

    /// Resolve a dotted path. An empty path resolves to the root.
    ///
    /// Numeric segments index into arrays. A leading `$.` is accepted.
    pub fn at(&self, path: &str) -> Option<&'a JsonValue> {
        let path = path.strip_prefix("$.").unwrap_or(path);
        let path = path.strip_prefix('$').unwrap_or(path);
        if path.is_empty() {
            return Some(self.root);
        }

        let mut current = self.root;
        for part in path.split('.') {
            current = match current {
                JsonValue::Object(map) => map.get(part)?,
                JsonValue::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Value at path, treating JSON null as absent
    fn present(&self, path: &str) -> Option<&'a JsonValue> {
        self.at(path).filter(|v| !v.is_null())
    }

    fn required(&self, path: &str) -> Result<&'a JsonValue> {
        self.present(path)
            .ok_or_else(|| Error::missing_expected(format!("key '{path}' not found")))
    }

    /// Object at path, `None` when absent or null
    pub fn object_optional(&self, path: &str) -> Result<Option<&'a JsonObject>> {
        match self.present(path) {
            None => Ok(None),
            Some(JsonValue::Object(map)) => Ok(Some(map)),
            Some(_) => Err(type_mismatch(path, "an object")),
        }
    }

    /// Object at path
    pub fn object_required(&self, path: &str) -> Result<&'a JsonObject> {
        match self.required(path)? {
            JsonValue::Object(map) => Ok(map),
            _ => Err(type_mismatch(path, "an object")),
        }
    }

    /// String at path, `None` when absent or null
    pub fn str_optional(&self, path: &str) -> Result<Option<&'a str>> {
        match self.present(path) {
            None => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(type_mismatch(path, "a string")),
        }
    }

    /// String at path
    pub fn str_required(&self, path: &str) -> Result<&'a str> {
        match self.required(path)? {
            JsonValue::String(s) => Ok(s.as_str()),
            _ => Err(type_mismatch(path, "a string")),
        }
    }

    /// Integer at path, `None` when absent or null
    ///
    /// Floats without a fractional part are accepted.
    pub fn integer_optional(&self, path: &str) -> Result<Option<i64>> {
        match self.present(path) {
            None => Ok(None),
            Some(value) => as_integer(value)
                .map(Some)
                .ok_or_else(|| type_mismatch(path, "an integer")),
        }
    }

    /// Integer at path
    pub fn integer_required(&self, path: &str) -> Result<i64> {
        as_integer(self.required(path)?).ok_or_else(|| type_mismatch(path, "an integer"))
    }

    /// Boolean at path, `None` when absent or null
    pub fn bool_optional(&self, path: &str) -> Result<Option<bool>> {
        match self.present(path) {
            None => Ok(None),
            Some(JsonValue::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(type_mismatch(path, "a boolean")),
        }
    }

    /// Boolean at path
    pub fn bool_required(&self, path: &str) -> Result<bool> {
        match self.required(path)? {
            JsonValue::Bool(b) => Ok(*b),
            _ => Err(type_mismatch(path, "a boolean")),
        }
    }

    /// Array at path, `None` when absent or null
    pub fn array_optional(&self, path: &str) -> Result<Option<&'a Vec<JsonValue>>> {
        match self.present(path) {
            None => Ok(None),
            Some(JsonValue::Array(arr)) => Ok(Some(arr)),
            Some(_) => Err(type_mismatch(path, "an array")),
        }
    }

    /// Array at path
    pub fn array_required(&self, path: &str) -> Result<&'a Vec<JsonValue>> {
        match self.required(path)? {
            JsonValue::Array(arr) => Ok(arr),
            _ => Err(type_mismatch(path, "an array")),
        }
    }

    /// Array of objects at path converted to records; absent yields empty
    pub fn records_at(&self, path: &str) -> Result<Vec<Record>> {
        match self.array_optional(path)? {
            Some(arr) => records_from(arr),
            None => Ok(Vec::new()),
        }
    }

    /// Evaluate a JSONPath expression, always returning a list of matches
    pub fn select(&self, path: &str) -> Result<Vec<JsonValue>> {
        let jp = JsonPath::try_from(path).map_err(|e| Error::JsonPath {
            message: format!("Invalid JSONPath '{path}': {e}"),
        })?;

        match jp.find(self.root) {
            JsonValue::Array(arr) => Ok(arr),
            JsonValue::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }
}

/// Convert a list of JSON values into records; every element must be an object
pub fn records_from(values: &[JsonValue]) -> Result<Vec<Record>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| match v {
            JsonValue::Object(map) => Ok(map.clone()),
            _ => Err(Error::unmarshal(format!("record at index {i} is not an object"))),
        })
        .collect()
}

fn as_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

fn type_mismatch(path: &str, expected: &str) -> Error {
    Error::unmarshal(format!("value at '{path}' is not {expected}"))
}
