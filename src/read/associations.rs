//! Associated records attached to read rows
//!
//! Associations are always joined by record id. They either come embedded
//! in each record (HubSpot `associations=companies,deals`), or are fetched
//! separately and matched back onto rows with [`join_associations`].

use crate::connector::{Association, ReadResultRow};
use crate::types::{scalar_to_string, JsonValue, Record};
use std::collections::{BTreeMap, HashMap};

/// Associated records of one row, by associated object name
pub type RowAssociations = BTreeMap<String, Vec<Association>>;

/// Associations listed inside each record
///
/// Expected shape: `{key: {object: {results_key: [{id_key, type_key}]}}}`.
/// A bare array in place of the `results_key` object is accepted too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedAssociations {
    /// Query parameter naming the associated objects, comma-joined
    pub param: String,
    pub key: String,
    pub results_key: String,
    pub id_key: String,
    pub type_key: String,
}

impl EmbeddedAssociations {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            key: "associations".to_string(),
            results_key: "results".to_string(),
            id_key: "id".to_string(),
            type_key: "type".to_string(),
        }
    }

    /// Associations of one record for the requested objects
    ///
    /// Object names match case-insensitively; requested objects the record
    /// lists nothing for map to an empty list.
    pub fn extract(&self, record: &Record, objects: &[String]) -> RowAssociations {
        let embedded = record.get(&self.key).and_then(JsonValue::as_object);
        objects
            .iter()
            .map(|object| {
                let group = embedded.and_then(|embedded| {
                    embedded.get(object).or_else(|| {
                        embedded
                            .iter()
                            .find(|(name, _)| name.eq_ignore_ascii_case(object))
                            .map(|(_, group)| group)
                    })
                });
                let items = group.and_then(|group| {
                    group
                        .get(&self.results_key)
                        .and_then(JsonValue::as_array)
                        .or_else(|| group.as_array())
                });
                let associations = items
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(JsonValue::as_object)
                            .filter_map(|item| self.association(item))
                            .collect()
                    })
                    .unwrap_or_default();
                (object.clone(), associations)
            })
            .collect()
    }

    fn association(&self, item: &Record) -> Option<Association> {
        Some(Association {
            object_id: item.get(&self.id_key).and_then(scalar_to_string)?,
            association_type: item.get(&self.type_key).and_then(scalar_to_string),
            raw: Some(item.clone()),
        })
    }

    /// Fill `associations` of every row from its raw record
    ///
    /// Rows are left untouched when no associated objects were requested.
    pub fn attach(&self, rows: &mut [ReadResultRow], objects: &[String]) {
        if objects.is_empty() {
            return;
        }
        for row in rows {
            row.associations = Some(self.extract(&row.raw, objects));
        }
    }
}

/// Attach associations fetched apart from the records, matching on row id
///
/// Rows whose id has no entry get an empty map, rows without an id too.
pub fn join_associations(rows: &mut [ReadResultRow], by_id: &HashMap<String, RowAssociations>) {
    for row in rows {
        let associations = row
            .id
            .as_ref()
            .and_then(|id| by_id.get(id))
            .cloned()
            .unwrap_or_default();
        row.associations = Some(associations);
    }
}
