//! Composite sObject collection batches

use super::connector::{SalesforceConnector, SOBJECTS};
use crate::codec::DecoratedRecord;
use crate::connector::{
    BatchRecord, BatchWriteParams, BatchWriteResult, BatchWriteType, BatchWriter, RecordError,
    WriteResult,
};
use crate::error::{Error, Result};
use crate::types::{JsonValue, Method, Operation, Record};
use crate::write::{align_results, write_in_chunks, Alignment};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Records per composite request
const COLLECTION_LIMIT: usize = 200;

/// `{"type": "Account"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SObjectType {
    #[serde(rename = "type")]
    pub object_type: String,
}

/// Extension placed next to every record of a collection request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SObjectAttributes {
    pub attributes: SObjectType,
}

impl SObjectAttributes {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            attributes: SObjectType {
                object_type: object_type.into(),
            },
        }
    }
}

fn decorate(object: &str, record: &BatchRecord) -> DecoratedRecord<SObjectAttributes> {
    let mut fields: Record = record.record.clone();
    if let Some(id) = &record.record_id {
        fields.insert("Id".to_string(), json!(id));
    }
    DecoratedRecord::new(fields, SObjectAttributes::new(object))
}

/// One result per entry of a collection response, in order
fn collection_results(body: &JsonValue) -> Result<Vec<WriteResult>> {
    let entries = body
        .as_array()
        .ok_or_else(|| Error::unmarshal("expected an array of save results"))?;

    Ok(entries
        .iter()
        .map(|entry| {
            if entry.get("success").and_then(JsonValue::as_bool) == Some(true) {
                let id = entry.get("id").and_then(JsonValue::as_str).map(String::from);
                WriteResult::succeeded(id, entry.as_object().cloned())
            } else {
                let errors = entry
                    .get("errors")
                    .and_then(JsonValue::as_array)
                    .map(|errors| errors.iter().cloned().map(RecordError::Provider).collect())
                    .unwrap_or_default();
                WriteResult::failed(errors)
            }
        })
        .collect())
}

impl SalesforceConnector {
    async fn write_collection(&self, chunk: BatchWriteParams) -> Result<BatchWriteResult> {
        let method = match chunk.batch_type {
            BatchWriteType::Create => Method::POST,
            BatchWriteType::Update => Method::PATCH,
            BatchWriteType::Upsert => {
                return Err(Error::UnsupportedBatchWriteType {
                    kind: chunk.batch_type.to_string(),
                })
            }
        };

        let records: Vec<DecoratedRecord<SObjectAttributes>> = chunk
            .batch
            .iter()
            .map(|record| decorate(&chunk.object_name, record))
            .collect();
        let body = json!({
            "allOrNone": chunk.all_or_none,
            "records": serde_json::to_value(&records)?,
        });

        let url = self.base().url(&["composite", SOBJECTS])?.to_string();
        let response = self
            .base()
            .json()
            .send(method, &url, Some(body), &[])
            .await?;

        let results = collection_results(response.body_required()?)?;
        debug!(
            object = %chunk.object_name,
            %method,
            records = chunk.batch.len(),
            results = results.len(),
            "Composite collection response"
        );
        Ok(BatchWriteResult::new(
            align_results(&chunk.batch, results, Alignment::Index),
            Vec::new(),
        ))
    }
}

#[async_trait]
impl BatchWriter for SalesforceConnector {
    async fn batch_write(&self, params: &BatchWriteParams) -> Result<BatchWriteResult> {
        params.validate()?;
        self.check(&params.object_name, Operation::Write)?;
        if params.batch_type == BatchWriteType::Upsert {
            return Err(Error::UnsupportedBatchWriteType {
                kind: params.batch_type.to_string(),
            });
        }

        write_in_chunks(params, COLLECTION_LIMIT, &self.runner, |chunk| {
            self.write_collection(chunk)
        })
        .await
    }
}
