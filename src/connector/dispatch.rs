//! Capability dispatch
//!
//! Free functions callers use when they hold a `dyn Connector`. Each one
//! fails with `CapabilityNotSupported` when the connector lacks the
//! capability, before any request is made.

use super::capabilities::Connector;
use super::params::{
    BatchWriteParams, BatchWriteResult, DeleteParams, DeleteResult, GetByIdsParams, ReadParams,
    ReadResult, ReadResultRow, UpsertMetadataParams, UpsertMetadataResult, WriteParams,
    WriteResult,
};
use crate::error::{Error, Result};
use crate::schema::ListObjectMetadataResult;
use crate::subscribe::{SubscribeParams, SubscriptionResult, VerificationParams, WebhookRequest};
use crate::types::Capability;
use tracing::debug;

fn unsupported(connector: &dyn Connector, capability: Capability) -> Error {
    debug!(provider = connector.provider(), %capability, "Capability not supported");
    Error::CapabilityNotSupported { capability }
}

pub async fn list_object_metadata(
    connector: &dyn Connector,
    objects: &[String],
) -> Result<ListObjectMetadataResult> {
    let Some(capability) = connector.as_object_metadata() else {
        return Err(unsupported(connector, Capability::ObjectMetadata));
    };
    capability.list_object_metadata(objects).await
}

pub async fn read(connector: &dyn Connector, params: &ReadParams) -> Result<ReadResult> {
    let Some(capability) = connector.as_reader() else {
        return Err(unsupported(connector, Capability::Read));
    };
    capability.read(params).await
}

pub async fn write(connector: &dyn Connector, params: &WriteParams) -> Result<WriteResult> {
    let Some(capability) = connector.as_writer() else {
        return Err(unsupported(connector, Capability::Write));
    };
    capability.write(params).await
}

pub async fn delete(connector: &dyn Connector, params: &DeleteParams) -> Result<DeleteResult> {
    let Some(capability) = connector.as_deleter() else {
        return Err(unsupported(connector, Capability::Delete));
    };
    capability.delete(params).await
}

pub async fn batch_write(
    connector: &dyn Connector,
    params: &BatchWriteParams,
) -> Result<BatchWriteResult> {
    let Some(capability) = connector.as_batch_writer() else {
        return Err(unsupported(connector, Capability::BatchWrite));
    };
    capability.batch_write(params).await
}

pub async fn subscribe(
    connector: &dyn Connector,
    params: &SubscribeParams,
) -> Result<SubscriptionResult> {
    let Some(capability) = connector.as_subscriber() else {
        return Err(unsupported(connector, Capability::Subscribe));
    };
    capability.subscribe(params).await
}

pub async fn delete_subscription(
    connector: &dyn Connector,
    result: &SubscriptionResult,
) -> Result<()> {
    let Some(capability) = connector.as_subscriber() else {
        return Err(unsupported(connector, Capability::Subscribe));
    };
    capability.delete_subscription(result).await
}

pub fn verify_webhook_message(
    connector: &dyn Connector,
    request: &WebhookRequest,
    params: &VerificationParams,
) -> Result<bool> {
    let Some(capability) = connector.as_webhook_verifier() else {
        return Err(unsupported(connector, Capability::WebhookVerify));
    };
    capability.verify_webhook_message(request, params)
}

pub async fn upsert_metadata(
    connector: &dyn Connector,
    params: &UpsertMetadataParams,
) -> Result<UpsertMetadataResult> {
    let Some(capability) = connector.as_metadata_upserter() else {
        return Err(unsupported(connector, Capability::UpsertMetadata));
    };
    capability.upsert_metadata(params).await
}

pub async fn get_records_by_ids(
    connector: &dyn Connector,
    params: &GetByIdsParams,
) -> Result<Vec<ReadResultRow>> {
    let Some(capability) = connector.as_batch_record_reader() else {
        return Err(unsupported(connector, Capability::BatchRecordRead));
    };
    capability.get_records_by_ids(params).await
}

/// Provider spelling of an object name; unchanged without a normalizer
pub fn normalize_entity_name(connector: &dyn Connector, name: &str) -> String {
    connector
        .as_entity_name_normalizer()
        .map_or_else(|| name.to_string(), |n| n.normalize_entity_name(name))
}
