//! Schema module
//!
//! Static schemas embedded per provider, the endpoint support matrix, and
//! field inference for objects without a static schema.
//!
//! # Features
//!
//! - **Two field shapes**: V1 (display names) and V2 (full field metadata),
//!   chosen by type parameter
//! - **Module canonicalization**: the empty module id means `root`
//! - **Endpoint Registry**: brace-expanded patterns gate operations per object
//! - **Inference**: field types guessed from sampled records

mod endpoints;
mod inference;
mod registry;
mod types;

pub use endpoints::{
    expand_braces, EndpointRegistry, EndpointRegistryInput, EndpointSupport, Support,
};
pub use inference::{infer_object_metadata, FieldInferrer};
pub use registry::{embedded, parse_embedded, EmbeddedSchemas, SchemaRegistry};
pub use types::{
    FieldMetadata, FieldValue, FieldsV1, FieldsV2, FieldsVersion, ListObjectMetadataResult,
    Metadata, Module, Object, ObjectMetadata, ValueType,
};

#[cfg(test)]
mod tests;
