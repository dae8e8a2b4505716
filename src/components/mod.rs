//! Components adapter
//!
//! A generic connector assembled from the shared pieces: a connector base,
//! an optional static schema, the endpoint support matrix, and declarative
//! read, write and metadata specs. Thin provider adapters are mostly a
//! configuration of this type.

mod connector;
mod spec;

pub use connector::ComponentsConnector;
pub use spec::{FieldsParam, MetadataSource, PageSize, ReadSpec, WriteSpec};

#[cfg(test)]
mod tests;
