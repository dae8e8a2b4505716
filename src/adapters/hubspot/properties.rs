//! Properties API: live metadata and property upserts

use super::connector::HubspotConnector;
use crate::connector::{
    FieldDefinition, FieldUpsertResult, MetadataUpserter, ObjectMetadataReader, UpsertAction,
    UpsertMetadataParams, UpsertMetadataResult,
};
use crate::error::{Error, ErrorKind, Result};
use crate::naming;
use crate::schema::{FieldMetadata, FieldValue, ListObjectMetadataResult, ObjectMetadata, ValueType};
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Field metadata of one property definition, keyed by property name
pub fn property_metadata(property: &JsonObject) -> Option<(String, FieldMetadata)> {
    let text = |key: &str| property.get(key).and_then(JsonValue::as_str).unwrap_or_default();

    let name = text("name");
    if name.is_empty() {
        return None;
    }
    let label = match text("label") {
        "" => naming::display_name(name),
        label => label.to_string(),
    };

    let provider_type = text("type");
    let value_type = match (provider_type, text("fieldType")) {
        ("bool", _) | ("enumeration", "booleancheckbox") => ValueType::Boolean,
        ("number", _) => ValueType::Float,
        ("date", _) => ValueType::Date,
        ("datetime", _) => ValueType::DateTime,
        ("enumeration", "checkbox") => ValueType::MultiSelect,
        ("enumeration", _) => ValueType::SingleSelect,
        ("string" | "phone_number", _) => ValueType::String,
        _ => ValueType::Other,
    };

    let values: Vec<FieldValue> = property
        .get("options")
        .and_then(JsonValue::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| {
                    Some(FieldValue {
                        value: option.get("value")?.as_str()?.to_string(),
                        display_value: option.get("label")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let metadata = FieldMetadata {
        display_name: label,
        value_type,
        provider_type: provider_type.to_string(),
        read_only: property
            .get("modificationMetadata")
            .and_then(|m| m.get("readOnlyValue"))
            .and_then(JsonValue::as_bool),
        is_required: None,
        values: (!values.is_empty()).then_some(values),
        field_id: None,
    };
    Some((name.to_string(), metadata))
}

/// Properties API body creating a field on an object
pub fn property_definition(object: &str, field: &FieldDefinition) -> JsonValue {
    let (kind, field_type) = match field.value_type {
        ValueType::Boolean => ("bool", "booleancheckbox"),
        ValueType::Int | ValueType::Float => ("number", "number"),
        ValueType::Date => ("date", "date"),
        ValueType::DateTime => ("datetime", "date"),
        ValueType::SingleSelect => ("enumeration", "select"),
        ValueType::MultiSelect => ("enumeration", "checkbox"),
        ValueType::String | ValueType::Other => ("string", "text"),
    };

    let mut body = json!({
        "name": field.field_name,
        "label": field.display_name,
        "type": kind,
        "fieldType": field_type,
        "groupName": format!("{}information", naming::singular(object)),
    });
    if let Some(description) = &field.description {
        body["description"] = json!(description);
    }

    let options: Vec<JsonValue> = match (&field.values, field.value_type) {
        (Some(values), _) => values
            .iter()
            .enumerate()
            .map(|(order, v)| {
                json!({"label": v.display_value, "value": v.value, "displayOrder": order})
            })
            .collect(),
        (None, ValueType::Boolean) => vec![
            json!({"label": "Yes", "value": "true", "displayOrder": 0}),
            json!({"label": "No", "value": "false", "displayOrder": 1}),
        ],
        _ => Vec::new(),
    };
    if !options.is_empty() {
        body["options"] = JsonValue::Array(options);
    }
    body
}

impl HubspotConnector {
    async fn object_properties(&self, object: &str) -> Result<ObjectMetadata> {
        let url = self.base().url(&["properties", object])?.to_string();
        let response = self
            .base()
            .json()
            .get(&url)
            .await
            .map_err(|e| e.for_object(object))?;

        let fields: BTreeMap<String, FieldMetadata> = response
            .query()?
            .array_required("results")?
            .iter()
            .filter_map(JsonValue::as_object)
            .filter_map(property_metadata)
            .collect();
        if fields.is_empty() {
            return Err(Error::missing_expected(format!("no properties found for {object}")));
        }
        Ok(ObjectMetadata::from_fields(naming::display_name(object), fields))
    }

    async fn upsert_field(&self, object: &str, field: &FieldDefinition) -> Result<FieldUpsertResult> {
        let body = property_definition(object, field);
        let mut url = self.base().url(&["properties", object])?;
        let json = self.base().json();

        let (action, response) = match json.post(&url.to_string(), &body).await {
            Ok(response) => (UpsertAction::Create, response),
            Err(e) if e.is(ErrorKind::Conflict) => {
                debug!(object, field = %field.field_name, "Property exists, updating");
                let mut update = body.clone();
                if let Some(map) = update.as_object_mut() {
                    map.remove("name");
                    map.remove("groupName");
                }
                url.add_path(&field.field_name);
                (UpsertAction::Update, json.patch(&url.to_string(), &update).await?)
            }
            Err(e) => return Err(e),
        };

        let metadata = response
            .body()?
            .and_then(JsonValue::as_object)
            .and_then(property_metadata)
            .map_or_else(
                || FieldMetadata::new(field.display_name.clone(), field.value_type),
                |(_, metadata)| metadata,
            );
        info!(object, field = %field.field_name, ?action, "Property upserted");

        Ok(FieldUpsertResult {
            field_name: field.field_name.clone(),
            action,
            metadata,
        })
    }
}

#[async_trait]
impl ObjectMetadataReader for HubspotConnector {
    async fn list_object_metadata(&self, objects: &[String]) -> Result<ListObjectMetadataResult> {
        if objects.is_empty() {
            return Err(Error::MissingObjects);
        }

        let jobs: Vec<BoxFuture<'_, Result<(String, Result<ObjectMetadata>)>>> = objects
            .iter()
            .map(|name| {
                async move { Ok((name.clone(), self.object_properties(name).await)) }.boxed()
            })
            .collect();
        let outcomes = self.runner.run(jobs).await?;

        let mut result = ListObjectMetadataResult::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(metadata) => result.insert(name, metadata),
                Err(e) => result.insert_error(name, e),
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl MetadataUpserter for HubspotConnector {
    async fn upsert_metadata(&self, params: &UpsertMetadataParams) -> Result<UpsertMetadataResult> {
        params.validate()?;

        let mut jobs: Vec<BoxFuture<'_, Result<(String, FieldUpsertResult)>>> = Vec::new();
        for (object, fields) in &params.fields {
            for field in fields {
                jobs.push(
                    async move { Ok((object.clone(), self.upsert_field(object, field).await?)) }
                        .boxed(),
                );
            }
        }
        let outcomes = self.runner.run(jobs).await?;

        let mut result = UpsertMetadataResult {
            success: true,
            fields: BTreeMap::new(),
        };
        for (object, field) in outcomes {
            result
                .fields
                .entry(object)
                .or_default()
                .insert(field.field_name.clone(), field);
        }
        Ok(result)
    }
}
