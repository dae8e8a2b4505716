//! Connector framework
//!
//! Capability traits, the parameter and result shapes they exchange, shared
//! construction, and dispatch helpers for callers holding a `dyn Connector`.
//!
//! # Capabilities
//!
//! A connector exposes any subset of: object metadata, read, write, delete,
//! batch write, subscribe, webhook verification, metadata upsert, batch
//! record read and entity name normalization. Absence is a
//! `CapabilityNotSupported` error at dispatch time.

mod base;
mod cache;
mod capabilities;
pub mod dispatch;
mod params;

pub use base::{ConnectorBase, ConnectorParams};
pub use cache::OnceCache;
pub use capabilities::{
    BatchRecordReader, BatchWriter, Connector, Deleter, EntityNameNormalizer, MetadataUpserter,
    ObjectMetadataReader, Reader, Subscriber, WebhookVerifier, Writer,
};
pub use params::{
    Association, BatchRecord, BatchStatus, BatchWriteParams, BatchWriteResult, BatchWriteType,
    DeleteParams, DeleteResult, FieldDefinition, FieldUpsertResult, GetByIdsParams, ReadParams,
    ReadResult, ReadResultRow, RecordError, UpsertAction, UpsertMetadataParams,
    UpsertMetadataResult, WriteParams, WriteResult, ALL_FIELDS,
};

#[cfg(test)]
mod tests;
