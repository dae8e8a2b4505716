//! Schema types
//!
//! A static schema file describes modules, the objects each module exposes,
//! and the fields of every object. Two field-map shapes exist: V1 maps a
//! field name to its display name, V2 maps a field name to full
//! [`FieldMetadata`]. The shape is chosen once, through the
//! [`FieldsVersion`] type parameter.

use crate::error::Error;
use crate::providers::ModuleId;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Normalized value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    String,
    Boolean,
    Int,
    Float,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    SingleSelect,
    MultiSelect,
    #[default]
    Other,
}

impl ValueType {
    /// The more general of two observed types
    pub fn merge_with(self, other: ValueType) -> ValueType {
        match (self, other) {
            (a, b) if a == b => a,
            (ValueType::Other, t) | (t, ValueType::Other) => t,
            (ValueType::Int, ValueType::Float) | (ValueType::Float, ValueType::Int) => {
                ValueType::Float
            }
            (ValueType::Date, ValueType::DateTime) | (ValueType::DateTime, ValueType::Date) => {
                ValueType::DateTime
            }
            _ => ValueType::String,
        }
    }
}

/// One allowed value of an enumerated field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub value: String,
    pub display_value: String,
}

/// Full description of a field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub display_name: String,
    #[serde(default)]
    pub value_type: ValueType,
    /// Type name as the provider reports it
    #[serde(default)]
    pub provider_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<FieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
}

impl FieldMetadata {
    pub fn new(display_name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            display_name: display_name.into(),
            value_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn provider_type(mut self, provider_type: impl Into<String>) -> Self {
        self.provider_type = provider_type.into();
        self
    }
}

/// Metadata returned to callers for one object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub display_name: String,
    /// Field name to display name
    pub fields_map: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, FieldMetadata>>,
}

impl ObjectMetadata {
    /// Build from full field metadata, deriving the display-name map
    pub fn from_fields(
        display_name: impl Into<String>,
        fields: BTreeMap<String, FieldMetadata>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            fields_map: fields
                .iter()
                .map(|(name, field)| (name.clone(), field.display_name.clone()))
                .collect(),
            fields: Some(fields),
        }
    }

    /// Add or replace a field
    pub fn add_field(&mut self, name: impl Into<String>, field: FieldMetadata) {
        let name = name.into();
        self.fields_map
            .insert(name.clone(), field.display_name.clone());
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(name, field);
    }
}

/// Outcome of a metadata call over several objects
///
/// A failing object lands in `errors` and does not fail the call.
#[derive(Debug, Default, Serialize)]
pub struct ListObjectMetadataResult {
    pub result: BTreeMap<String, ObjectMetadata>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: BTreeMap<String, Error>,
}

impl ListObjectMetadataResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: impl Into<String>, metadata: ObjectMetadata) {
        self.result.insert(object.into(), metadata);
    }

    pub fn insert_error(&mut self, object: impl Into<String>, error: Error) {
        self.errors.insert(object.into(), error);
    }

    /// Merge another result into this one
    pub fn extend(&mut self, other: ListObjectMetadataResult) {
        self.result.extend(other.result);
        self.errors.extend(other.errors);
    }
}

fn serialize_errors<S: Serializer>(
    errors: &BTreeMap<String, Error>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(errors.len()))?;
    for (object, error) in errors {
        map.serialize_entry(object, &error.to_string())?;
    }
    map.end()
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::FieldsV1 {}
    impl Sealed for super::FieldsV2 {}
}

/// Field-map shape of a schema file
///
/// Implemented only by [`FieldsV1`] and [`FieldsV2`].
pub trait FieldsVersion: sealed::Sealed + Debug + Clone + Send + Sync + 'static {
    type Fields: DeserializeOwned + Serialize + Debug + Clone + Default + Send + Sync;

    /// Convert a schema object's fields into caller-facing metadata
    fn object_metadata(display_name: &str, fields: &Self::Fields) -> ObjectMetadata;
}

/// Field name to display name
#[derive(Debug, Clone, Copy)]
pub enum FieldsV1 {}

/// Field name to [`FieldMetadata`]
#[derive(Debug, Clone, Copy)]
pub enum FieldsV2 {}

impl FieldsVersion for FieldsV1 {
    type Fields = BTreeMap<String, String>;

    fn object_metadata(display_name: &str, fields: &Self::Fields) -> ObjectMetadata {
        ObjectMetadata {
            display_name: display_name.to_string(),
            fields_map: fields.clone(),
            fields: None,
        }
    }
}

impl FieldsVersion for FieldsV2 {
    type Fields = BTreeMap<String, FieldMetadata>;

    fn object_metadata(display_name: &str, fields: &Self::Fields) -> ObjectMetadata {
        ObjectMetadata::from_fields(display_name, fields.clone())
    }
}

/// Object entry in a schema file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct Object<F: FieldsVersion> {
    pub display_name: String,
    /// Path relative to the module path
    pub path: String,
    /// Key holding the records array in list responses, empty for a root array
    #[serde(default)]
    pub response_key: String,
    #[serde(default)]
    pub fields: F::Fields,
    #[serde(default, rename = "docsURL", skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,
}

/// Module entry in a schema file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct Module<F: FieldsVersion> {
    #[serde(default)]
    pub id: ModuleId,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub objects: BTreeMap<String, Object<F>>,
}

/// Root of a schema file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct Metadata<F: FieldsVersion> {
    pub modules: BTreeMap<ModuleId, Module<F>>,
}
