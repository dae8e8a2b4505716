//! Turning provider records into read rows

use crate::codec::{flatten_nested_fields, nested_value};
use crate::connector::{ReadResultRow, ALL_FIELDS};
use crate::types::{scalar_to_string, Record};
use std::collections::BTreeSet;

/// Projection and id lookup applied to every record of a page
#[derive(Debug, Clone)]
pub struct RowMarshaller {
    /// Envelope whose fields are lifted before projection (`properties`, `attributes`)
    nested_key: Option<String>,
    /// Candidate id paths, first match wins
    id_paths: Vec<String>,
}

impl Default for RowMarshaller {
    fn default() -> Self {
        Self {
            nested_key: None,
            id_paths: vec!["id".to_string()],
        }
    }
}

impl RowMarshaller {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_nested_key(mut self, key: impl Into<String>) -> Self {
        self.nested_key = Some(key.into());
        self
    }

    /// Replace the id paths (`id.record_id`, `Id`, ...)
    #[must_use]
    pub fn with_id_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn nested_key(&self) -> Option<&str> {
        self.nested_key.as_deref()
    }

    /// Record id rendered as a string
    pub fn record_id(&self, record: &Record) -> Option<String> {
        self.id_paths
            .iter()
            .find_map(|path| nested_value(record, path).and_then(scalar_to_string))
            .filter(|id| !id.is_empty())
    }

    /// One row per record, in order
    pub fn marshal(&self, records: Vec<Record>, fields: &BTreeSet<String>) -> Vec<ReadResultRow> {
        records
            .into_iter()
            .map(|record| self.marshal_one(record, fields))
            .collect()
    }

    pub fn marshal_one(&self, record: Record, fields: &BTreeSet<String>) -> ReadResultRow {
        let flat = match &self.nested_key {
            Some(key) => flatten_nested_fields(&record, key),
            None => record.clone(),
        };

        ReadResultRow {
            fields: project(&flat, fields),
            id: self.record_id(&record),
            raw: record,
            associations: None,
        }
    }
}

/// Requested fields present in the record, keys lowercased
///
/// Matching is case-insensitive; `*` selects every field.
pub fn project(record: &Record, fields: &BTreeSet<String>) -> Record {
    let all = fields.contains(ALL_FIELDS);
    let wanted: BTreeSet<String> = fields.iter().map(|f| f.to_lowercase()).collect();

    record
        .iter()
        .filter_map(|(key, value)| {
            let key = key.to_lowercase();
            (all || wanted.contains(&key)).then(|| (key, value.clone()))
        })
        .collect()
}
