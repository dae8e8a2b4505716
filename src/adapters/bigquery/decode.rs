//! Arrow IPC to JSON records

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use arrow::ipc::reader::StreamReader;
use arrow::json::ArrayWriter;
use arrow::record_batch::RecordBatch;
use std::io::Cursor;

/// Decode a serialized IPC schema followed by serialized record batches
///
/// Storage API sessions hand out the schema once and the batches per
/// response; together they form one IPC stream.
pub fn decode_arrow(schema: &[u8], batches: &[u8]) -> Result<Vec<Record>> {
    if schema.is_empty() {
        return Err(Error::missing_expected("read session has no Arrow schema"));
    }

    let mut stream = Vec::with_capacity(schema.len() + batches.len());
    stream.extend_from_slice(schema);
    stream.extend_from_slice(batches);

    let reader = StreamReader::try_new(Cursor::new(stream), None)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    records_from_batches(&batches)
}

/// Rows of record batches as JSON objects, nulls omitted
pub fn records_from_batches(batches: &[RecordBatch]) -> Result<Vec<Record>> {
    if batches.iter().all(|b| b.num_rows() == 0) {
        return Ok(Vec::new());
    }

    let mut writer = ArrayWriter::new(Vec::new());
    let refs: Vec<&RecordBatch> = batches.iter().collect();
    writer.write_batches(&refs)?;
    writer.finish()?;

    let rows: Vec<JsonValue> = serde_json::from_slice(&writer.into_inner())?;
    Ok(rows
        .into_iter()
        .filter_map(|row| match row {
            JsonValue::Object(record) => Some(record),
            _ => None,
        })
        .collect())
}
