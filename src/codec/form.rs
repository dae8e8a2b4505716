//! Form-urlencoded bodies

use crate::error::{Error, Result};
use crate::types::JsonValue;
use url::form_urlencoded;

/// Content type for form bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encode a JSON object as a form body
///
/// Keys are emitted in sorted order. Scalars are written as-is, `null` is
/// omitted, arrays repeat the key once per element, and objects (top-level
/// or inside arrays) are JSON-encoded into a single value.
pub fn encode_form(value: &JsonValue) -> Result<String> {
    let JsonValue::Object(map) = value else {
        return Err(Error::invalid_param("body", "form body must be a JSON object"));
    };

    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for key in keys {
        match &map[key.as_str()] {
            JsonValue::Null => {}
            JsonValue::Array(items) => {
                for item in items {
                    if let Some(text) = form_value(item)? {
                        serializer.append_pair(key, &text);
                    }
                }
            }
            other => {
                if let Some(text) = form_value(other)? {
                    serializer.append_pair(key, &text);
                }
            }
        }
    }

    Ok(serializer.finish())
}

fn form_value(value: &JsonValue) -> Result<Option<String>> {
    Ok(match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Array(_) | JsonValue::Object(_) => Some(serde_json::to_string(value)?),
    })
}
