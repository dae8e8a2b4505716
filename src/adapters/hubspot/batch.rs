//! Batch create/update and batch read by ids

use super::connector::{HubspotConnector, BATCH_LIMIT, PROPERTIES_KEY};
use crate::connector::{
    BatchRecordReader, BatchWriteParams, BatchWriteResult, BatchWriteType, BatchWriter,
    GetByIdsParams, ReadResultRow, WriteResult, ALL_FIELDS,
};
use crate::error::{Error, Result};
use crate::jsonquery::JsonQuery;
use crate::read::{join_associations, RowMarshaller};
use crate::types::{scalar_to_string, JsonValue, Operation};
use crate::write::{align_results, unstructured_failure, write_in_chunks, Alignment};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use tracing::debug;

impl HubspotConnector {
    async fn write_chunk(&self, chunk: BatchWriteParams) -> Result<BatchWriteResult> {
        let (action, alignment) = match chunk.batch_type {
            BatchWriteType::Create => ("create", Alignment::Index),
            BatchWriteType::Update => ("update", Alignment::Id),
            BatchWriteType::Upsert => {
                return Err(Error::UnsupportedBatchWriteType {
                    kind: chunk.batch_type.to_string(),
                })
            }
        };

        let inputs: Vec<JsonValue> = chunk
            .batch
            .iter()
            .map(|record| {
                let mut input = json!({});
                input[PROPERTIES_KEY] = JsonValue::Object(record.record.clone());
                if let Some(id) = &record.record_id {
                    input["id"] = json!(id);
                }
                if let Some(associations) = &record.associations {
                    input["associations"] = associations.clone();
                }
                input
            })
            .collect();

        let url = self
            .base()
            .url(&["objects", &chunk.object_name, "batch", action])?
            .to_string();
        let response = self
            .batch_json
            .post(&url, &json!({ "inputs": inputs }))
            .await?;
        if let Some(err) = unstructured_failure(&response, "results") {
            return Err(err);
        }

        let Some(body) = response.body()? else {
            return Ok(BatchWriteResult::new(
                align_results(&chunk.batch, Vec::new(), alignment),
                Vec::new(),
            ));
        };
        let query = JsonQuery::new(body);
        let results: Vec<WriteResult> = query
            .array_optional("results")?
            .map(|results| {
                results
                    .iter()
                    .filter_map(JsonValue::as_object)
                    .map(|record| {
                        let id = record.get("id").and_then(scalar_to_string);
                        WriteResult::succeeded(id, Some(record.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let errors = query.array_optional("errors")?.cloned().unwrap_or_default();

        debug!(
            object = %chunk.object_name,
            action,
            succeeded = results.len(),
            errors = errors.len(),
            "HubSpot batch response"
        );
        Ok(BatchWriteResult::new(
            align_results(&chunk.batch, results, alignment),
            errors,
        ))
    }

    async fn read_chunk(&self, params: &GetByIdsParams, ids: &[String]) -> Result<Vec<ReadResultRow>> {
        let mut body = json!({
            "inputs": ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
        });
        if !params.fields.contains(ALL_FIELDS) {
            body[PROPERTIES_KEY] = json!(params.fields);
        }

        let url = self
            .base()
            .url(&["objects", &params.object_name, "batch", "read"])?
            .to_string();
        let response = self
            .base()
            .json()
            .post(&url, &body)
            .await
            .map_err(|e| e.for_object(&params.object_name))?;

        let records = match response.body()? {
            Some(body) => JsonQuery::new(body).records_at("results")?,
            None => Vec::new(),
        };
        Ok(RowMarshaller::new()
            .with_nested_key(PROPERTIES_KEY)
            .marshal(records, &params.fields))
    }
}

#[async_trait]
impl BatchWriter for HubspotConnector {
    async fn batch_write(&self, params: &BatchWriteParams) -> Result<BatchWriteResult> {
        params.validate()?;
        self.components.endpoints().check(
            self.base().module_id(),
            &params.object_name,
            Operation::Write,
        )?;
        if params.batch_type == BatchWriteType::Upsert {
            return Err(Error::UnsupportedBatchWriteType {
                kind: params.batch_type.to_string(),
            });
        }

        write_in_chunks(params, BATCH_LIMIT, &self.runner, |chunk| self.write_chunk(chunk)).await
    }
}

#[async_trait]
impl BatchRecordReader for HubspotConnector {
    async fn get_records_by_ids(&self, params: &GetByIdsParams) -> Result<Vec<ReadResultRow>> {
        params.validate()?;
        self.components.endpoints().check(
            self.base().module_id(),
            &params.object_name,
            Operation::Read,
        )?;

        let jobs: Vec<BoxFuture<'_, Result<Vec<ReadResultRow>>>> = params
            .ids
            .chunks(BATCH_LIMIT)
            .map(|ids| self.read_chunk(params, ids).boxed())
            .collect();
        let mut rows: Vec<ReadResultRow> = self
            .runner
            .run(jobs)
            .await?
            .into_iter()
            .flatten()
            .collect();

        if !params.associated_objects.is_empty() {
            let by_id = self
                .fetch_associations(&params.object_name, &params.ids, &params.associated_objects)
                .await?;
            join_associations(&mut rows, &by_id);
        }
        Ok(rows)
    }
}
