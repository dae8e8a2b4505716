//! Windowed Storage Read connector

use super::backend::{RestBackend, SessionRequest, StorageReadBackend, StreamPage};
use super::token::{PageToken, SessionState, StreamState};
use crate::connector::{Connector, ConnectorBase, ReadParams, ReadResult, Reader};
use crate::error::{Error, Result};
use crate::providers::ModuleId;
use crate::read::RowMarshaller;
use crate::simultaneously::Simultaneously;
use crate::types::Record;
use async_trait::async_trait;
use futures::future::BoxFuture;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_WINDOW_DAYS: i64 = 30;
const DEFAULT_BACKFILL_DAYS: i64 = 365;
const DEFAULT_TIMESTAMP_COLUMN: &str = "updated_at";
const DEFAULT_MAX_STREAMS: u32 = 4;

/// Backfill start from connector metadata: RFC 3339 or `YYYY-MM-DD`
fn parse_start(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
        .ok_or_else(|| Error::invalid_param("backfillStart", format!("'{value}' is not a date")))
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Reads tables of one dataset; the object name is the table name
///
/// Connector metadata: `project` and `dataset` (required), `timestampColumn`,
/// `backfillStart`, `maxStreams`.
#[derive(Debug)]
pub struct BigQueryConnector {
    base: ConnectorBase,
    backend: Arc<dyn StorageReadBackend>,
    runner: Simultaneously,
    project: String,
    dataset: String,
    timestamp_column: String,
    backfill_start: Option<DateTime<Utc>>,
    max_streams: u32,
    window: Duration,
    marshaller: RowMarshaller,
}

impl BigQueryConnector {
    pub fn new(base: ConnectorBase) -> Result<Self> {
        let project = base
            .metadata("project")
            .ok_or_else(|| Error::missing_param("project"))?
            .to_string();
        let backend = Arc::new(RestBackend::new(&base, project));
        Self::with_backend(base, backend)
    }

    /// Use another backend, e.g. an in-process one
    pub fn with_backend(base: ConnectorBase, backend: Arc<dyn StorageReadBackend>) -> Result<Self> {
        let required = |key: &str| {
            base.metadata(key)
                .map(String::from)
                .ok_or_else(|| Error::missing_param(key))
        };
        let project = required("project")?;
        let dataset = required("dataset")?;
        let backfill_start = base.metadata("backfillStart").map(parse_start).transpose()?;
        let max_streams = match base.metadata("maxStreams") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::invalid_param("maxStreams", format!("'{raw}' is not a number")))?,
            None => DEFAULT_MAX_STREAMS,
        };
        let timestamp_column = base
            .metadata("timestampColumn")
            .unwrap_or(DEFAULT_TIMESTAMP_COLUMN)
            .to_string();

        Ok(Self {
            base,
            backend,
            runner: Simultaneously::default(),
            project,
            dataset,
            timestamp_column,
            backfill_start,
            max_streams,
            window: Duration::days(DEFAULT_WINDOW_DAYS),
            marshaller: RowMarshaller::new(),
        })
    }

    /// Width of a backfill window
    #[must_use]
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    fn table(&self, object: &str) -> String {
        format!(
            "projects/{}/datasets/{}/tables/{object}",
            self.project, self.dataset
        )
    }

    /// With `since` the read is one window; without it, a backfill
    /// partitioned into windows
    fn first_token(&self, params: &ReadParams, now: DateTime<Utc>) -> PageToken {
        let end = params.until.unwrap_or(now);
        match params.since {
            Some(since) => PageToken {
                window_start: since,
                window_end: end.max(since),
                end: end.max(since),
                session: None,
            },
            None => {
                let start = self
                    .backfill_start
                    .unwrap_or(now - Duration::days(DEFAULT_BACKFILL_DAYS));
                PageToken::first(start.min(end), end, self.window)
            }
        }
    }

    fn row_restriction(&self, token: &PageToken) -> String {
        format!(
            "{column} >= TIMESTAMP(\"{start}\") AND {column} < TIMESTAMP(\"{end}\")",
            column = self.timestamp_column,
            start = timestamp(token.window_start),
            end = timestamp(token.window_end),
        )
    }

    async fn open_session(&self, params: &ReadParams, token: &PageToken) -> Result<SessionState> {
        let request = SessionRequest {
            table: self.table(&params.object_name),
            selected_fields: if params.all_fields() {
                Vec::new()
            } else {
                params.fields.iter().cloned().collect()
            },
            row_restriction: Some(self.row_restriction(token)),
            max_streams: self.max_streams,
        };
        let session = self
            .backend
            .create_session(&request)
            .await
            .map_err(|e| e.for_object(&params.object_name))?;

        info!(
            table = %request.table,
            window_start = %token.window_start,
            window_end = %token.window_end,
            streams = session.streams.len(),
            "Opened read session"
        );
        Ok(SessionState {
            name: session.name,
            schema: session.schema,
            streams: session
                .streams
                .into_iter()
                .map(|name| StreamState {
                    name,
                    offset: 0,
                    done: false,
                })
                .collect(),
        })
    }

    /// One page from every unfinished stream, in stream order
    ///
    /// A round that reads no records always finishes the session.
    async fn read_streams(&self, session: &mut SessionState) -> Result<Vec<Record>> {
        let pending: Vec<usize> = session
            .streams
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.done)
            .map(|(i, _)| i)
            .collect();

        let schema = session.schema.as_str();
        let streams = &session.streams;
        let jobs: Vec<BoxFuture<'_, Result<StreamPage>>> = pending
            .iter()
            .map(|&i| {
                let stream = &streams[i];
                self.backend.read_stream(schema, &stream.name, stream.offset)
            })
            .collect();
        let pages = self.runner.run(jobs).await?;

        let mut records = Vec::new();
        for (i, page) in pending.into_iter().zip(pages) {
            let stream = &mut session.streams[i];
            // An empty page ends the stream even when the backend reports more
            stream.done = page.done || page.records.is_empty();
            stream.offset += page.records.len() as u64;
            records.extend(page.records);
        }
        Ok(records)
    }
}

#[async_trait]
impl Reader for BigQueryConnector {
    async fn read(&self, params: &ReadParams) -> Result<ReadResult> {
        params.validate()?;

        let mut token = if params.next_page.is_empty() {
            self.first_token(params, Utc::now())
        } else {
            PageToken::decode(&params.next_page)?
        };

        // Exhausted windows are skipped within one call
        loop {
            let mut session = match token.session.take() {
                Some(session) => session,
                None => self.open_session(params, &token).await?,
            };
            let records = self.read_streams(&mut session).await?;

            let next = if session.is_done() {
                token.next_window(self.window)
            } else {
                Some(PageToken {
                    session: Some(session),
                    ..token.clone()
                })
            };

            match next {
                Some(next) if records.is_empty() => {
                    debug!(window_start = %next.window_start, "No records read, advancing");
                    token = next;
                }
                next => {
                    let next_page = next.map(|t| t.encode()).transpose()?.unwrap_or_default();
                    let rows = self.marshaller.marshal(records, &params.fields);
                    return Ok(ReadResult::new(rows, next_page));
                }
            }
        }
    }
}

impl Connector for BigQueryConnector {
    fn provider(&self) -> &str {
        self.base.provider_name()
    }

    fn module(&self) -> &ModuleId {
        self.base.module_id()
    }

    fn as_reader(&self) -> Option<&dyn Reader> {
        Some(self)
    }
}
