//! Single-record writes

use crate::codec::nested_value;
use crate::connector::WriteResult;
use crate::error::Result;
use crate::http::JsonHttpResponse;
use crate::jsonquery::JsonQuery;
use crate::naming;
use crate::types::{scalar_to_string, JsonObject, JsonValue};
use serde_json::json;

/// Shape of the request body of a write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    /// The record as-is
    #[default]
    Json,
    /// `{"data": {"type", "id"?, "attributes"}}`; the type defaults to the singular object name
    JsonApi { type_name: Option<String> },
    /// `{"<key>": record}`
    Wrapped(String),
    /// `application/x-www-form-urlencoded`
    Form,
}

impl BodyEncoding {
    /// Request body for a record of `object`
    pub fn encode(&self, object: &str, record: &JsonValue, id: Option<&str>) -> JsonValue {
        match self {
            BodyEncoding::Json | BodyEncoding::Form => record.clone(),
            BodyEncoding::JsonApi { type_name } => {
                let type_name = type_name.clone().unwrap_or_else(|| naming::singular(object));
                let mut data = json!({
                    "type": type_name,
                    "attributes": record,
                });
                if let Some(id) = id {
                    data["id"] = JsonValue::String(id.to_string());
                }
                json!({ "data": data })
            }
            BodyEncoding::Wrapped(key) => {
                let mut wrapped = JsonObject::new();
                wrapped.insert(key.clone(), record.clone());
                JsonValue::Object(wrapped)
            }
        }
    }

    pub fn is_form(&self) -> bool {
        matches!(self, BodyEncoding::Form)
    }
}

/// Build a [`WriteResult`] from a successful write response
///
/// The written record is looked up at `record_path` (the whole body when
/// `None`), its id at the first matching `id_paths` entry. An empty body
/// reports success with the id of the input.
pub fn parse_write_response(
    response: &JsonHttpResponse,
    record_path: Option<&str>,
    id_paths: &[String],
    input_id: Option<&str>,
) -> Result<WriteResult> {
    let input_id = input_id.map(String::from);
    let Some(body) = response.body()? else {
        return Ok(WriteResult::succeeded(input_id, None));
    };

    let record = match record_path {
        Some(path) => JsonQuery::new(body).object_optional(path)?,
        None => body.as_object(),
    };
    let Some(record) = record else {
        return Ok(WriteResult::succeeded(input_id, None));
    };

    let record_id = id_paths
        .iter()
        .find_map(|path| nested_value(record, path).and_then(scalar_to_string))
        .or(input_id);
    Ok(WriteResult::succeeded(record_id, Some(record.clone())))
}
