//! JSON query helpers
//!
//! Path-based access over parsed `serde_json::Value` trees with typed
//! optional/required lookups. Dotted paths (`data.attributes.name`,
//! `results.0.id`) cover the common case; full JSONPath expressions are
//! available through [`JsonQuery::select`].

mod query;

pub use query::{records_from, JsonQuery};
