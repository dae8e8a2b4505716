//! Codec helpers
//!
//! Serialization containers and encoders shared by the read and write
//! pipelines:
//!
//! - [`RawJson`]: typed view plus the full raw object, typed view wins on re-serialize
//! - [`DecoratedRecord`]: a record with a structured extension flattened alongside it
//! - [`encode_form`]: deterministic `application/x-www-form-urlencoded` bodies
//! - [`flatten_nested_fields`] / [`nested_value`]: lifting nested attribute envelopes

mod decorated;
mod flatten;
mod form;
mod raw_json;

pub use decorated::DecoratedRecord;
pub use flatten::{flatten_nested_fields, nested_value};
pub use form::{encode_form, FORM_CONTENT_TYPE};
pub use raw_json::RawJson;

#[cfg(test)]
mod tests;
