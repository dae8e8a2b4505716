//! Object metadata from the describe resource

use super::connector::{SalesforceConnector, SOBJECTS};
use crate::connector::ObjectMetadataReader;
use crate::error::{Error, Result};
use crate::schema::{FieldMetadata, FieldValue, ListObjectMetadataResult, ObjectMetadata, ValueType};
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;

/// Field metadata of one describe field entry, keyed by API name
pub fn describe_field(field: &JsonObject) -> Option<(String, FieldMetadata)> {
    let name = field.get("name")?.as_str()?.to_string();
    let flag = |key: &str| field.get(key).and_then(JsonValue::as_bool);

    let provider_type = field
        .get("type")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let value_type = match provider_type {
        "boolean" => ValueType::Boolean,
        "int" | "long" => ValueType::Int,
        "double" | "currency" | "percent" => ValueType::Float,
        "date" => ValueType::Date,
        "datetime" => ValueType::DateTime,
        "picklist" => ValueType::SingleSelect,
        "multipicklist" => ValueType::MultiSelect,
        "string" | "textarea" | "email" | "phone" | "url" | "id" | "reference" => ValueType::String,
        _ => ValueType::Other,
    };

    let values: Vec<FieldValue> = field
        .get("picklistValues")
        .and_then(JsonValue::as_array)
        .into_iter()
        .flatten()
        .filter(|v| v.get("active").and_then(JsonValue::as_bool) != Some(false))
        .filter_map(|v| {
            let value = v.get("value")?.as_str()?.to_string();
            let display_value = v
                .get("label")
                .and_then(JsonValue::as_str)
                .map_or_else(|| value.clone(), String::from);
            Some(FieldValue {
                value,
                display_value,
            })
        })
        .collect();

    let creatable = flag("createable").unwrap_or(false);
    let required = creatable
        && flag("nillable") == Some(false)
        && flag("defaultedOnCreate") != Some(true);

    let metadata = FieldMetadata {
        display_name: field
            .get("label")
            .and_then(JsonValue::as_str)
            .map_or_else(|| name.clone(), String::from),
        value_type,
        provider_type: provider_type.to_string(),
        read_only: flag("updateable").map(|updateable| !updateable && !creatable),
        is_required: Some(required),
        values: (!values.is_empty()).then_some(values),
        field_id: None,
    };
    Some((name, metadata))
}

impl SalesforceConnector {
    async fn describe(&self, object: &str) -> Result<ObjectMetadata> {
        let url = self
            .base()
            .url(&[SOBJECTS, object, "describe"])?
            .to_string();
        let response = self
            .base()
            .json()
            .get(&url)
            .await
            .map_err(|e| e.for_object(object))?;

        let query = response.query()?;
        let fields: BTreeMap<String, FieldMetadata> = query
            .array_required("fields")?
            .iter()
            .filter_map(JsonValue::as_object)
            .filter_map(describe_field)
            .collect();
        if fields.is_empty() {
            return Err(Error::missing_expected(format!("{object} describes no fields")));
        }

        let display_name = query
            .str_optional("labelPlural")?
            .or(query.str_optional("label")?)
            .unwrap_or(object)
            .to_string();
        Ok(ObjectMetadata::from_fields(display_name, fields))
    }
}

#[async_trait]
impl ObjectMetadataReader for SalesforceConnector {
    async fn list_object_metadata(&self, objects: &[String]) -> Result<ListObjectMetadataResult> {
        if objects.is_empty() {
            return Err(Error::MissingObjects);
        }

        let jobs: Vec<BoxFuture<'_, Result<(String, Result<ObjectMetadata>)>>> = objects
            .iter()
            .map(|name| async move { Ok((name.clone(), self.describe(name).await)) }.boxed())
            .collect();
        let mut result = ListObjectMetadataResult::new();
        for (name, outcome) in self.runner.run(jobs).await? {
            match outcome {
                Ok(metadata) => result.insert(name, metadata),
                Err(e) => result.insert_error(name, e),
            }
        }
        Ok(result)
    }
}
