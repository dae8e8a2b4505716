//! Record reads, writes and deletes

use super::connector::{AttioConnector, PAGE_SIZE, VALUES_KEY};
use crate::connector::{
    DeleteParams, DeleteResult, Deleter, ReadParams, ReadResult, Reader, WriteParams, WriteResult,
    Writer,
};
use crate::error::{Error, Result};
use crate::read::PageParser;
use crate::types::{JsonValue, Operation};
use crate::write::parse_write_response;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

fn offset(next_page: &str) -> Result<u64> {
    if next_page.is_empty() {
        return Ok(0);
    }
    next_page
        .parse()
        .map_err(|_| Error::invalid_param("nextPage", format!("expected an offset, got '{next_page}'")))
}

/// `{"data": {"values": {...}}}`
fn record_body(record: &JsonValue) -> JsonValue {
    let mut data = json!({});
    data[VALUES_KEY] = record.clone();
    json!({ "data": data })
}

#[async_trait]
impl Reader for AttioConnector {
    async fn read(&self, params: &ReadParams) -> Result<ReadResult> {
        params.validate()?;
        self.check(&params.object_name, Operation::Read)?;

        let limit = params.page_size.unwrap_or(PAGE_SIZE);
        let body = json!({
            "limit": limit,
            "offset": offset(&params.next_page)?,
        });
        let url = self
            .base
            .url(&["objects", &params.object_name, "records", "query"])?
            .to_string();
        let response = self
            .base
            .json()
            .post(&url, &body)
            .await
            .map_err(|e| e.for_object(&params.object_name))?;

        let mut paginator = self.paginator.clone();
        paginator.page_size = limit;
        PageParser {
            extractor: &self.records,
            paginator: &paginator,
            marshaller: &self.marshaller,
            fields: &params.fields,
        }
        .parse(&response, &url, &params.next_page)
    }
}

#[async_trait]
impl Writer for AttioConnector {
    async fn write(&self, params: &WriteParams) -> Result<WriteResult> {
        params.validate()?;
        self.check(&params.object_name, Operation::Write)?;

        let mut url = self.base.url(&["objects", &params.object_name, "records"])?;
        let body = record_body(&params.record_data);
        let json = self.base.json();
        let id = params.update_id();
        let response = match id {
            Some(id) => {
                url.add_path(id);
                json.patch(&url.to_string(), &body).await?
            }
            None => json.post(&url.to_string(), &body).await?,
        };

        let result = parse_write_response(&response, Some("data"), &["id.record_id".to_string()], id)?;
        debug!(object = %params.object_name, record_id = ?result.record_id, "Attio record written");
        Ok(result)
    }
}

#[async_trait]
impl Deleter for AttioConnector {
    async fn delete(&self, params: &DeleteParams) -> Result<DeleteResult> {
        params.validate()?;
        self.check(&params.object_name, Operation::Delete)?;

        let url = self
            .base
            .url(&["objects", &params.object_name, "records", &params.record_id])?
            .to_string();
        let response = self.base.json().delete(&url).await?;
        Ok(DeleteResult {
            success: response.is_success(),
        })
    }
}
