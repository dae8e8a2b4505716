//! Storage Read API access

use super::decode::decode_arrow;
use crate::connector::ConnectorBase;
use crate::error::{Error, Result};
use crate::http::JsonHttpClient;
use crate::types::{JsonValue, Record};
use crate::urlbuilder::UrlBuilder;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use tracing::debug;

/// Parameters of a new read session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionRequest {
    /// `projects/{project}/datasets/{dataset}/tables/{table}`
    pub table: String,
    /// Empty selects every column
    pub selected_fields: Vec<String>,
    pub row_restriction: Option<String>,
    pub max_streams: u32,
}

/// A session as created by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadSession {
    pub name: String,
    pub streams: Vec<String>,
    /// Serialized Arrow schema, base64
    pub schema: String,
}

/// Rows read from one stream
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamPage {
    pub records: Vec<Record>,
    /// No rows remain past this page
    pub done: bool,
}

/// Session creation and stream reads
///
/// The REST backend talks to the Storage API; tests plug in their own.
#[async_trait]
pub trait StorageReadBackend: Send + Sync + fmt::Debug {
    async fn create_session(&self, request: &SessionRequest) -> Result<ReadSession>;

    /// Read the stream from `offset` on
    async fn read_stream(&self, schema: &str, stream: &str, offset: u64) -> Result<StreamPage>;
}

// ============================================================================
// REST backend
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    name: String,
    #[serde(default)]
    streams: Vec<StreamName>,
    #[serde(default)]
    arrow_schema: Option<ArrowSchema>,
}

#[derive(Deserialize)]
struct StreamName {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrowSchema {
    serialized_schema: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadRowsResponse {
    #[serde(default)]
    arrow_record_batch: Option<ArrowBatch>,
    #[serde(default)]
    stats: Option<JsonValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrowBatch {
    serialized_record_batch: String,
}

fn base64_bytes(encoded: &str, what: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| Error::unmarshal(format!("{what} is not valid base64: {e}")))
}

/// Storage API over its JSON transcoding
#[derive(Debug, Clone)]
pub struct RestBackend {
    json: JsonHttpClient,
    module_url: String,
    /// Project billed for the sessions
    project: String,
}

impl RestBackend {
    pub fn new(base: &ConnectorBase, project: impl Into<String>) -> Self {
        Self {
            json: base.json(),
            module_url: base.module_url(),
            project: project.into(),
        }
    }
}

#[async_trait]
impl StorageReadBackend for RestBackend {
    async fn create_session(&self, request: &SessionRequest) -> Result<ReadSession> {
        let url = UrlBuilder::new(&self.module_url, &[request.table.as_str()])?.to_string();
        let mut read_options = json!({ "selectedFields": request.selected_fields });
        if let Some(restriction) = &request.row_restriction {
            read_options["rowRestriction"] = json!(restriction);
        }
        let body = json!({
            "parent": format!("projects/{}", self.project),
            "readSession": {
                "table": request.table,
                "dataFormat": "ARROW",
                "readOptions": read_options,
            },
            "maxStreamCount": request.max_streams,
        });

        let session: SessionResponse = self.json.post(&url, &body).await?.unmarshal()?;
        debug!(session = %session.name, streams = session.streams.len(), "Read session created");
        Ok(ReadSession {
            name: session.name,
            streams: session.streams.into_iter().map(|s| s.name).collect(),
            schema: session
                .arrow_schema
                .map(|s| s.serialized_schema)
                .unwrap_or_default(),
        })
    }

    async fn read_stream(&self, schema: &str, stream: &str, offset: u64) -> Result<StreamPage> {
        let mut url = UrlBuilder::new(&self.module_url, &[stream])?;
        url.with_query("offset", offset.to_string());
        let response = self.json.get(&url.to_string()).await?;

        // Server-streamed responses arrive as an array of messages
        let messages: Vec<ReadRowsResponse> = match response.body()? {
            None => Vec::new(),
            Some(JsonValue::Array(_)) => response.unmarshal()?,
            Some(_) => vec![response.unmarshal()?],
        };

        let schema = base64_bytes(schema, "Arrow schema")?;
        let mut batches = Vec::new();
        let mut finished = false;
        for message in &messages {
            if let Some(batch) = &message.arrow_record_batch {
                batches.extend(base64_bytes(&batch.serialized_record_batch, "record batch")?);
            }
            finished |= message
                .stats
                .as_ref()
                .and_then(|s| s.pointer("/progress/atResponseEnd"))
                .and_then(JsonValue::as_f64)
                .is_some_and(|progress| progress >= 1.0);
        }

        let records = if batches.is_empty() {
            Vec::new()
        } else {
            decode_arrow(&schema, &batches)?
        };
        Ok(StreamPage {
            done: finished || records.is_empty(),
            records,
        })
    }
}
