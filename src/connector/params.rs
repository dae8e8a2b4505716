//! Parameters and results of the capability methods

use crate::error::{Error, Result};
use crate::schema::{FieldMetadata, FieldValue, ValueType};
use crate::types::{JsonValue, Record};
use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Requesting this field projects every field of the record
pub const ALL_FIELDS: &str = "*";

// ============================================================================
// Read
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadParams {
    pub object_name: String,
    pub fields: BTreeSet<String>,
    /// Opaque token from a previous result; empty for the first page
    #[serde(default)]
    pub next_page: String,
    /// Inclusive lower bound on the record's update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_objects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ReadParams {
    pub fn new<I, S>(object_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            object_name: object_name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn next_page(mut self, token: impl Into<String>) -> Self {
        self.next_page = token.into();
        self
    }

    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    #[must_use]
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    #[must_use]
    pub fn associated_objects<I, S>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associated_objects = objects.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.object_name.trim().is_empty() {
            return Err(Error::MissingObjects);
        }
        if self.fields.is_empty() {
            return Err(Error::MissingFields);
        }
        Ok(())
    }

    /// Whether every field was requested
    pub fn all_fields(&self) -> bool {
        self.fields.contains(ALL_FIELDS)
    }
}

/// A record associated with a read row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Record>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResultRow {
    /// Requested fields, keys lowercased
    pub fields: Record,
    /// The record as the provider returned it
    pub raw: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<BTreeMap<String, Vec<Association>>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    pub rows: usize,
    pub data: Vec<ReadResultRow>,
    /// Empty when there are no more pages
    pub next_page: String,
    pub done: bool,
}

impl ReadResult {
    /// Assemble a page, deriving `rows` and `done`
    pub fn new(data: Vec<ReadResultRow>, next_page: impl Into<String>) -> Self {
        let next_page = next_page.into();
        Self {
            rows: data.len(),
            done: next_page.is_empty(),
            data,
            next_page,
        }
    }

    /// Final empty page
    pub fn empty() -> Self {
        Self::new(Vec::new(), "")
    }
}

// ============================================================================
// Write / Delete
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteParams {
    pub object_name: String,
    /// Non-empty switches the write from create to update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub record_data: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<JsonValue>,
}

impl WriteParams {
    pub fn create(object_name: impl Into<String>, record_data: JsonValue) -> Self {
        Self {
            object_name: object_name.into(),
            record_data,
            ..Self::default()
        }
    }

    pub fn update(
        object_name: impl Into<String>,
        record_id: impl Into<String>,
        record_data: JsonValue,
    ) -> Self {
        Self {
            record_id: Some(record_id.into()),
            ..Self::create(object_name, record_data)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.object_name.trim().is_empty() {
            return Err(Error::MissingObjects);
        }
        if self.record_data.is_null() {
            return Err(Error::MissingRecordData);
        }
        Ok(())
    }

    /// Record id of an update, `None` for a create
    pub fn update_id(&self) -> Option<&str> {
        self.record_id.as_deref().filter(|id| !id.is_empty())
    }
}

const ROLLED_BACK: &str = "rolled back with the rest of the batch";

/// A per-record failure
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The provider returned nothing for this record
    Unprocessed,
    /// The record was valid but the all-or-none transaction rolled back
    RolledBack,
    /// Error payload as the provider returned it
    Provider(JsonValue),
}

impl RecordError {
    pub fn is_unprocessed(&self) -> bool {
        matches!(self, RecordError::Unprocessed)
    }

    /// Typed error for callers matching on kinds
    pub fn to_error(&self) -> Error {
        match self {
            RecordError::Unprocessed => Error::BatchUnprocessedRecord,
            RecordError::RolledBack => Error::Other(ROLLED_BACK.to_string()),
            RecordError::Provider(payload) => Error::Other(payload.to_string()),
        }
    }
}

impl Serialize for RecordError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RecordError::Unprocessed => {
                serializer.serialize_str(&Error::BatchUnprocessedRecord.to_string())
            }
            RecordError::RolledBack => serializer.serialize_str(ROLLED_BACK),
            RecordError::Provider(payload) => payload.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RecordError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
}

impl WriteResult {
    pub fn succeeded(record_id: Option<String>, data: Option<Record>) -> Self {
        Self {
            success: true,
            record_id,
            errors: Vec::new(),
            data,
        }
    }

    pub fn failed(errors: Vec<RecordError>) -> Self {
        Self {
            success: false,
            errors,
            ..Self::default()
        }
    }

    pub fn unprocessed() -> Self {
        Self::failed(vec![RecordError::Unprocessed])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    pub object_name: String,
    pub record_id: String,
}

impl DeleteParams {
    pub fn new(object_name: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            record_id: record_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.object_name.trim().is_empty() {
            return Err(Error::MissingObjects);
        }
        if self.record_id.trim().is_empty() {
            return Err(Error::MissingRecordId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
}

// ============================================================================
// Batch Write
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchWriteType {
    #[default]
    Create,
    Update,
    Upsert,
}

impl std::fmt::Display for BatchWriteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BatchWriteType::Create => "create",
            BatchWriteType::Update => "update",
            BatchWriteType::Upsert => "upsert",
        };
        f.write_str(s)
    }
}

/// One record of a batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub record: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<JsonValue>,
}

impl BatchRecord {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteParams {
    pub object_name: String,
    #[serde(rename = "type")]
    pub batch_type: BatchWriteType,
    pub batch: Vec<BatchRecord>,
    /// Ask the provider to roll back everything when one record fails
    #[serde(default)]
    pub all_or_none: bool,
}

impl BatchWriteParams {
    pub fn new(object_name: impl Into<String>, batch_type: BatchWriteType, batch: Vec<BatchRecord>) -> Self {
        Self {
            object_name: object_name.into(),
            batch_type,
            batch,
            all_or_none: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.object_name.trim().is_empty() {
            return Err(Error::MissingObjects);
        }
        if self.batch.is_empty() {
            return Err(Error::MissingRecordData);
        }
        if self.batch_type == BatchWriteType::Update
            && self
                .batch
                .iter()
                .any(|r| r.record_id.as_deref().is_none_or(str::is_empty))
        {
            return Err(Error::MissingRecordId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchStatus {
    Success,
    PartialSuccess,
    Failure,
}

impl BatchStatus {
    /// Success when all succeeded, Failure when all failed
    pub fn from_results(results: &[WriteResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        if succeeded == results.len() && !results.is_empty() {
            BatchStatus::Success
        } else if succeeded == 0 {
            BatchStatus::Failure
        } else {
            BatchStatus::PartialSuccess
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteResult {
    pub status: BatchStatus,
    /// One result per input record, in input order
    pub results: Vec<WriteResult>,
    /// Batch-level errors as the provider returned them
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonValue>,
}

impl BatchWriteResult {
    pub fn new(results: Vec<WriteResult>, errors: Vec<JsonValue>) -> Self {
        Self {
            status: BatchStatus::from_results(&results),
            results,
            errors,
        }
    }
}

// ============================================================================
// Upsert Metadata / Batch Record Read
// ============================================================================

/// A custom field to create or update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub field_name: String,
    pub display_name: String,
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<FieldValue>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMetadataParams {
    /// Object name to the fields to upsert on it
    pub fields: BTreeMap<String, Vec<FieldDefinition>>,
}

impl UpsertMetadataParams {
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::MissingObjects);
        }
        if self.fields.values().all(Vec::is_empty) {
            return Err(Error::MissingFields);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpsertResult {
    pub field_name: String,
    pub action: UpsertAction,
    pub metadata: FieldMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMetadataResult {
    pub success: bool,
    /// Object name to field name to outcome
    pub fields: BTreeMap<String, BTreeMap<String, FieldUpsertResult>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetByIdsParams {
    pub object_name: String,
    pub ids: Vec<String>,
    pub fields: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_objects: Vec<String>,
}

impl GetByIdsParams {
    pub fn validate(&self) -> Result<()> {
        if self.object_name.trim().is_empty() {
            return Err(Error::MissingObjects);
        }
        if self.ids.is_empty() {
            return Err(Error::MissingRecordId);
        }
        if self.fields.is_empty() {
            return Err(Error::MissingFields);
        }
        Ok(())
    }
}
