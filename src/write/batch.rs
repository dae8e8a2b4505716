//! Batch write alignment and status
//!
//! Providers answer a batch either in input order or keyed by record id,
//! and often leave out the records they rejected. Everything here keeps
//! one result per input record, in input order.

use crate::connector::{
    BatchRecord, BatchWriteParams, BatchWriteResult, RecordError, WriteResult,
};
use crate::error::{Error, Result};
use crate::http::{classify_status, HttpResponse, JsonHttpResponse};
use crate::jsonquery::JsonQuery;
use crate::simultaneously::Simultaneously;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, info};

/// How provider results map back to input records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// The n-th result belongs to the n-th record
    Index,
    /// Results carry the id of the record they belong to
    Id,
}

/// One result per input record; inputs without a result are unprocessed
pub fn align_results(
    batch: &[BatchRecord],
    responses: Vec<WriteResult>,
    alignment: Alignment,
) -> Vec<WriteResult> {
    match alignment {
        Alignment::Index => {
            let mut responses = responses.into_iter();
            batch
                .iter()
                .map(|_| responses.next().unwrap_or_else(WriteResult::unprocessed))
                .collect()
        }
        Alignment::Id => {
            let mut by_id: HashMap<String, WriteResult> = responses
                .into_iter()
                .filter_map(|r| r.record_id.clone().map(|id| (id, r)))
                .collect();
            batch
                .iter()
                .map(|record| {
                    record
                        .record_id
                        .as_ref()
                        .and_then(|id| by_id.remove(id))
                        .unwrap_or_else(WriteResult::unprocessed)
                })
                .collect()
        }
    }
}

/// Mark every record failed when any failed, keeping ids and own errors
pub fn apply_all_or_none(results: &mut [WriteResult]) {
    if results.iter().all(|r| r.success) {
        return;
    }
    for result in results.iter_mut().filter(|r| r.success) {
        result.success = false;
        result.errors.push(RecordError::RolledBack);
    }
}

/// Error predicate for batch endpoints
///
/// 400 and 409 responses of batch endpoints carry per-record errors and are
/// parsed instead of raised.
pub fn partial_failure_predicate(response: &HttpResponse) -> bool {
    !response.is_success() && !matches!(response.code(), 400 | 409)
}

/// Typed error for a failed batch response without per-record results
///
/// `None` when the response is a success or lists results under
/// `results_path`.
pub fn unstructured_failure(response: &JsonHttpResponse, results_path: &str) -> Option<Error> {
    if response.is_success() {
        return None;
    }
    let structured = response
        .body()
        .ok()
        .flatten()
        .and_then(|body| JsonQuery::new(body).at(results_path))
        .is_some_and(serde_json::Value::is_array);
    if structured {
        return None;
    }
    classify_status(
        response.code,
        &response.headers,
        String::from_utf8_lossy(&response.bytes).into_owned(),
        false,
    )
}

/// Split a batch into chunks of at most `cap` records
pub fn split_batch(params: &BatchWriteParams, cap: usize) -> Vec<BatchWriteParams> {
    params
        .batch
        .chunks(cap.max(1))
        .map(|chunk| BatchWriteParams {
            object_name: params.object_name.clone(),
            batch_type: params.batch_type,
            batch: chunk.to_vec(),
            all_or_none: params.all_or_none,
        })
        .collect()
}

/// Send an oversized batch in chunks and merge the results in input order
///
/// With `all_or_none` the rollback rule is applied to every chunk on its own.
pub async fn write_in_chunks<F, Fut>(
    params: &BatchWriteParams,
    cap: usize,
    runner: &Simultaneously,
    write_chunk: F,
) -> Result<BatchWriteResult>
where
    F: Fn(BatchWriteParams) -> Fut,
    Fut: Future<Output = Result<BatchWriteResult>>,
{
    let chunks = split_batch(params, cap);
    if chunks.len() > 1 {
        debug!(
            object = %params.object_name,
            records = params.batch.len(),
            chunks = chunks.len(),
            "Splitting batch write"
        );
    }

    let outcomes = runner.run(chunks.into_iter().map(&write_chunk)).await?;

    // Each chunk is its own transaction: a rolled-back chunk never fails the
    // records another chunk committed.
    let mut results = Vec::with_capacity(params.batch.len());
    let mut errors = Vec::new();
    for mut outcome in outcomes {
        if params.all_or_none {
            apply_all_or_none(&mut outcome.results);
        }
        results.extend(outcome.results);
        errors.extend(outcome.errors);
    }

    let merged = BatchWriteResult::new(results, errors);
    info!(
        object = %params.object_name,
        status = ?merged.status,
        records = merged.results.len(),
        "Batch write finished"
    );
    Ok(merged)
}
