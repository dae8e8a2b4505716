//! Object metadata from the attributes API

use super::connector::AttioConnector;
use crate::connector::ObjectMetadataReader;
use crate::error::{Error, Result};
use crate::naming;
use crate::schema::{FieldMetadata, ListObjectMetadataResult, ObjectMetadata, ValueType};
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;

/// Field metadata of one attribute, keyed by its API slug
pub fn attribute_metadata(attribute: &JsonObject) -> Option<(String, FieldMetadata)> {
    let slug = attribute.get("api_slug")?.as_str()?.to_string();
    let flag = |key: &str| attribute.get(key).and_then(JsonValue::as_bool);

    let provider_type = attribute
        .get("type")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let value_type = match provider_type {
        "checkbox" => ValueType::Boolean,
        "number" | "currency" => ValueType::Float,
        "rating" => ValueType::Int,
        "date" => ValueType::Date,
        "timestamp" => ValueType::DateTime,
        "select" | "status" if flag("is_multiselect") == Some(true) => ValueType::MultiSelect,
        "select" | "status" => ValueType::SingleSelect,
        "text" | "email-address" | "domain" | "phone-number" => ValueType::String,
        _ => ValueType::Other,
    };

    let metadata = FieldMetadata {
        display_name: attribute
            .get("title")
            .and_then(JsonValue::as_str)
            .map_or_else(|| naming::display_name(&slug), String::from),
        value_type,
        provider_type: provider_type.to_string(),
        read_only: flag("is_writable").map(|writable| !writable),
        is_required: flag("is_required"),
        values: None,
        field_id: attribute
            .get("id")
            .and_then(|id| id.get("attribute_id"))
            .and_then(JsonValue::as_str)
            .map(String::from),
    };
    Some((slug, metadata))
}

impl AttioConnector {
    async fn attributes(&self, object: &str) -> Result<ObjectMetadata> {
        let url = self
            .base
            .url(&["objects", object, "attributes"])?
            .to_string();
        let response = self
            .base
            .json()
            .get(&url)
            .await
            .map_err(|e| e.for_object(object))?;

        let fields: BTreeMap<String, FieldMetadata> = response
            .query()?
            .array_required("data")?
            .iter()
            .filter_map(JsonValue::as_object)
            .filter_map(attribute_metadata)
            .collect();
        if fields.is_empty() {
            return Err(Error::missing_expected(format!("{object} has no attributes")));
        }
        Ok(ObjectMetadata::from_fields(naming::display_name(object), fields))
    }
}

#[async_trait]
impl ObjectMetadataReader for AttioConnector {
    async fn list_object_metadata(&self, objects: &[String]) -> Result<ListObjectMetadataResult> {
        if objects.is_empty() {
            return Err(Error::MissingObjects);
        }

        let jobs: Vec<BoxFuture<'_, Result<(String, Result<ObjectMetadata>)>>> = objects
            .iter()
            .map(|name| async move { Ok((name.clone(), self.attributes(name).await)) }.boxed())
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
