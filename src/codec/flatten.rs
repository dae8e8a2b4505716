//! Nested attribute helpers

use crate::jsonquery::JsonQuery;
use crate::types::{JsonValue, Record};

/// Lift the fields of a nested object to the top level
///
/// The nested key itself is removed. Existing top-level keys win over
/// nested ones. A record whose `key` is missing or not an object is returned
/// unchanged.
pub fn flatten_nested_fields(record: &Record, key: &str) -> Record {
    let Some(JsonValue::Object(nested)) = record.get(key) else {
        return record.clone();
    };

    let mut flat = record.clone();
    flat.remove(key);
    for (name, value) in nested {
        if !flat.contains_key(name) {
            flat.insert(name.clone(), value.clone());
        }
    }
    flat
}

/// Value at a dotted path inside a record
pub fn nested_value<'a>(record: &'a Record, path: &str) -> Option<&'a JsonValue> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = record.get(head)?;
    match rest {
        Some(rest) => JsonQuery::new(value).at(rest),
        None => Some(value),
    }
}
