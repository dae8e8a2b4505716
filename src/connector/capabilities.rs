//! Connector and capability traits
//!
//! A connector advertises each capability through an `as_*` accessor. The
//! defaults return `None`, so an adapter only overrides the accessors for
//! what it can actually do.

use super::params::{
    BatchWriteParams, BatchWriteResult, DeleteParams, DeleteResult, GetByIdsParams, ReadParams,
    ReadResult, ReadResultRow, UpsertMetadataParams, UpsertMetadataResult, WriteParams,
    WriteResult,
};
use crate::error::Result;
use crate::providers::ModuleId;
use crate::schema::{EndpointRegistry, ListObjectMetadataResult};
use crate::subscribe::{SubscribeParams, SubscriptionResult, VerificationParams, WebhookRequest};
use crate::types::Capability;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt::Debug;

// ============================================================================
// Capability Traits
// ============================================================================

#[async_trait]
pub trait ObjectMetadataReader: Send + Sync {
    /// Metadata of several objects; per-object failures land in `errors`
    async fn list_object_metadata(&self, objects: &[String]) -> Result<ListObjectMetadataResult>;
}

#[async_trait]
pub trait Reader: Send + Sync {
    /// Read one page of records
    async fn read(&self, params: &ReadParams) -> Result<ReadResult>;
}

#[async_trait]
pub trait Writer: Send + Sync {
    /// Create a record, or update it when `record_id` is set
    async fn write(&self, params: &WriteParams) -> Result<WriteResult>;
}

#[async_trait]
pub trait Deleter: Send + Sync {
    async fn delete(&self, params: &DeleteParams) -> Result<DeleteResult>;
}

#[async_trait]
pub trait BatchWriter: Send + Sync {
    /// Write many records in as few requests as the provider allows
    ///
    /// Per-record failures are reported in the result, not as errors.
    async fn batch_write(&self, params: &BatchWriteParams) -> Result<BatchWriteResult>;
}

#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn subscribe(&self, params: &SubscribeParams) -> Result<SubscriptionResult>;

    /// Remove every registration of a previous subscription
    async fn delete_subscription(&self, result: &SubscriptionResult) -> Result<()>;
}

pub trait WebhookVerifier: Send + Sync {
    /// `Ok(true)` when the delivery is signed with the shared secret
    fn verify_webhook_message(
        &self,
        request: &WebhookRequest,
        params: &VerificationParams,
    ) -> Result<bool>;
}

#[async_trait]
pub trait MetadataUpserter: Send + Sync {
    async fn upsert_metadata(&self, params: &UpsertMetadataParams) -> Result<UpsertMetadataResult>;
}

#[async_trait]
pub trait BatchRecordReader: Send + Sync {
    /// Fetch records by id; unknown ids are skipped
    async fn get_records_by_ids(&self, params: &GetByIdsParams) -> Result<Vec<ReadResultRow>>;
}

pub trait EntityNameNormalizer: Send + Sync {
    /// Provider spelling of an object name (e.g. `Contact` → `contacts`)
    fn normalize_entity_name(&self, name: &str) -> String;
}

// ============================================================================
// Connector Trait
// ============================================================================

/// A connector bound to one provider, tenant and module
pub trait Connector: Send + Sync + Debug {
    /// Provider name as listed in the registry
    fn provider(&self) -> &str;

    fn module(&self) -> &ModuleId;

    fn as_object_metadata(&self) -> Option<&dyn ObjectMetadataReader> {
        None
    }

    fn as_reader(&self) -> Option<&dyn Reader> {
        None
    }

    fn as_writer(&self) -> Option<&dyn Writer> {
        None
    }

    fn as_deleter(&self) -> Option<&dyn Deleter> {
        None
    }

    fn as_batch_writer(&self) -> Option<&dyn BatchWriter> {
        None
    }

    fn as_subscriber(&self) -> Option<&dyn Subscriber> {
        None
    }

    fn as_webhook_verifier(&self) -> Option<&dyn WebhookVerifier> {
        None
    }

    fn as_metadata_upserter(&self) -> Option<&dyn MetadataUpserter> {
        None
    }

    fn as_batch_record_reader(&self) -> Option<&dyn BatchRecordReader> {
        None
    }

    fn as_entity_name_normalizer(&self) -> Option<&dyn EntityNameNormalizer> {
        None
    }

    /// Objects the adapter declares, when it keeps an endpoint matrix
    fn endpoints(&self) -> Option<&EndpointRegistry> {
        None
    }

    /// Capabilities this connector exposes
    fn capabilities(&self) -> BTreeSet<Capability> {
        let flags = [
            (Capability::ObjectMetadata, self.as_object_metadata().is_some()),
            (Capability::Read, self.as_reader().is_some()),
            (Capability::Write, self.as_writer().is_some()),
            (Capability::Delete, self.as_deleter().is_some()),
            (Capability::Subscribe, self.as_subscriber().is_some()),
            (Capability::WebhookVerify, self.as_webhook_verifier().is_some()),
            (Capability::BatchWrite, self.as_batch_writer().is_some()),
            (Capability::UpsertMetadata, self.as_metadata_upserter().is_some()),
            (Capability::BatchRecordRead, self.as_batch_record_reader().is_some()),
            (
                Capability::EntityNameNormalize,
                self.as_entity_name_normalizer().is_some(),
            ),
        ];
        flags
            .into_iter()
            .filter_map(|(capability, present)| present.then_some(capability))
            .collect()
    }
}
