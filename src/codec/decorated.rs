//! Record plus structured extension

use crate::types::{JsonValue, Record};
use serde::ser::Error as SerError;
use serde::{Serialize, Serializer};

/// A record serialized together with the fields of an extension value
///
/// The extension's top-level keys sit next to the record's keys; on conflict
/// the extension wins. Used for payloads such as composite trees that tag
/// each record with an `attributes` discriminator.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedRecord<T> {
    pub record: Record,
    pub extension: T,
}

impl<T> DecoratedRecord<T> {
    pub fn new(record: Record, extension: T) -> Self {
        Self { record, extension }
    }
}

impl<T: Serialize> Serialize for DecoratedRecord<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extension = serde_json::to_value(&self.extension).map_err(S::Error::custom)?;
        let mut merged = self.record.clone();
        match extension {
            JsonValue::Object(fields) => merged.extend(fields),
            JsonValue::Null => {}
            _ => return Err(S::Error::custom("record extension must serialize to a JSON object")),
        }
        merged.serialize(serializer)
    }
}
