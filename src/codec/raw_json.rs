//! Dual typed/raw JSON container

use crate::types::{JsonObject, JsonValue};
use serde::de::{DeserializeOwned, Error as DeError};
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Deref, DerefMut};

/// A typed view of a JSON object that keeps every field it was parsed from
///
/// Deserializing parses the input once into `T` and once into a map.
/// Serializing writes the raw map with the keys produced by `T` layered on
/// top, so unknown fields survive and edits to the typed view are reflected.
#[derive(Debug, Clone, PartialEq)]
pub struct RawJson<T> {
    data: T,
    raw: JsonObject,
}

impl<T> RawJson<T> {
    /// Wrap a typed value with no extra raw fields
    pub fn new(data: T) -> Self {
        Self {
            data,
            raw: JsonObject::new(),
        }
    }

    /// The raw object as originally parsed
    pub fn raw(&self) -> &JsonObject {
        &self.raw
    }

    /// Consume the container, returning the typed view
    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> Deref for RawJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for RawJson<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for RawJson<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        let raw = match &value {
            JsonValue::Object(map) => map.clone(),
            _ => return Err(D::Error::custom("expected a JSON object")),
        };
        let data = T::deserialize(value).map_err(D::Error::custom)?;
        Ok(Self { data, raw })
    }
}

impl<T: Serialize> Serialize for RawJson<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let typed = serde_json::to_value(&self.data).map_err(S::Error::custom)?;
        let JsonValue::Object(typed) = typed else {
            return Err(S::Error::custom("typed view must serialize to a JSON object"));
        };

        let mut merged = self.raw.clone();
        merged.extend(typed);
        merged.serialize(serializer)
    }
}
