//! Tests for the connector framework

use super::*;
use crate::auth::ClientBuilder;
use crate::error::ErrorKind;
use crate::providers::ModuleId;
use crate::types::Capability;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn client() -> crate::auth::AuthenticatedHttpClient {
    ClientBuilder::new().bearer("token").build().unwrap()
}

#[derive(Debug)]
struct ReadOnly {
    module: ModuleId,
}

#[async_trait]
impl Reader for ReadOnly {
    async fn read(&self, params: &ReadParams) -> crate::error::Result<ReadResult> {
        params.validate()?;
        Ok(ReadResult::empty())
    }
}

impl Connector for ReadOnly {
    fn provider(&self) -> &str {
        "test"
    }

    fn module(&self) -> &ModuleId {
        &self.module
    }

    fn as_reader(&self) -> Option<&dyn Reader> {
        Some(self)
    }
}

#[test]
fn test_read_params_validation() {
    let err = ReadParams::new("", ["id"]).validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingObjects);

    let err = ReadParams::new("contacts", Vec::<String>::new())
        .validate()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingFields);

    let params = ReadParams::new("contacts", ["*"]);
    params.validate().unwrap();
    assert!(params.all_fields());
}

#[test]
fn test_read_result_invariants() {
    let rows = vec![ReadResultRow::default(), ReadResultRow::default()];
    let result = ReadResult::new(rows, "cursor-2");
    assert_eq!(result.rows, 2);
    assert!(!result.done);

    let result = ReadResult::new(vec![ReadResultRow::default()], "");
    assert!(result.done);
    assert_eq!(result.next_page, "");
}

#[test]
fn test_write_and_delete_validation() {
    let err = WriteParams::create("contacts", serde_json::Value::Null)
        .validate()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRecordData);

    let update = WriteParams::update("contacts", "42", json!({"name": "Ada"}));
    assert_eq!(update.update_id(), Some("42"));
    let create = WriteParams::update("contacts", "", json!({"name": "Ada"}));
    assert_eq!(create.update_id(), None);

    let err = DeleteParams::new("contacts", " ").validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRecordId);
}

#[test]
fn test_batch_update_requires_ids() {
    let record = json!({"name": "Ada"}).as_object().cloned().unwrap();
    let params = BatchWriteParams::new(
        "contacts",
        BatchWriteType::Update,
        vec![BatchRecord::new(record.clone()).with_id("1"), BatchRecord::new(record)],
    );
    assert_eq!(params.validate().unwrap_err().kind(), ErrorKind::MissingRecordId);
}

#[test]
fn test_batch_status() {
    let ok = WriteResult::succeeded(Some("1".into()), None);
    let failed = WriteResult::unprocessed();

    assert_eq!(BatchStatus::from_results(&[ok.clone(), ok.clone()]), BatchStatus::Success);
    assert_eq!(
        BatchStatus::from_results(&[ok, failed.clone()]),
        BatchStatus::PartialSuccess
    );
    assert_eq!(BatchStatus::from_results(&[failed]), BatchStatus::Failure);
}

#[test]
fn test_record_error_serialization() {
    let result = WriteResult::failed(vec![
        RecordError::Unprocessed,
        RecordError::Provider(json!({"message": "bad email"})),
    ]);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["errors"][1], json!({"message": "bad email"}));
    assert!(value["errors"][0].as_str().unwrap().contains("not processed"));
}

#[tokio::test]
async fn test_dispatch_capability_gate() {
    let connector = ReadOnly {
        module: ModuleId::root(),
    };

    let result = dispatch::read(&connector, &ReadParams::new("contacts", ["id"]))
        .await
        .unwrap();
    assert!(result.done);

    let err = dispatch::write(&connector, &WriteParams::create("contacts", json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapabilityNotSupported);

    assert_eq!(
        connector.capabilities().into_iter().collect::<Vec<_>>(),
        vec![Capability::Read]
    );
    assert_eq!(dispatch::normalize_entity_name(&connector, "Contact"), "Contact");
}

#[test]
fn test_base_renders_workspace_url() {
    let base = ConnectorBase::new(
        ConnectorParams::new("freshdesk")
            .workspace("acme")
            .client(client()),
    )
    .unwrap();
    assert_eq!(base.base_url(), "https://acme.freshdesk.com");
    assert_eq!(base.module_url(), "https://acme.freshdesk.com/api/v2");
    assert_eq!(
        base.url(&["contacts"]).unwrap().to_string(),
        "https://acme.freshdesk.com/api/v2/contacts"
    );
}

#[test]
fn test_base_rejects_unknown_module_and_missing_client() {
    let err = ConnectorBase::new(
        ConnectorParams::new("hubspot")
            .module("assets")
            .client(client()),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedModule);

    let err = ConnectorBase::new(ConnectorParams::new("stripe")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingParameter);
}

#[test]
fn test_base_url_override() {
    let base = ConnectorBase::new(
        ConnectorParams::new("hubspot")
            .module("marketing")
            .base_url("http://127.0.0.1:9000/")
            .client(client()),
    )
    .unwrap();
    assert_eq!(base.module_url(), "http://127.0.0.1:9000/marketing/v3");
    assert_eq!(
        base.root_url(&["oauth", "v1"]).unwrap().to_string(),
        "http://127.0.0.1:9000/oauth/v1"
    );
}

#[tokio::test]
async fn test_once_cache_initializes_once() {
    let cache: Arc<OnceCache<String, String>> = Arc::new(OnceCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            cache
                .get_or_try_init(&"companies".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    Ok("obj_123".to_string())
                })
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "obj_123");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        cache.get(&"companies".to_string()).await,
        Some("obj_123".to_string())
    );
}

#[tokio::test]
async fn test_once_cache_does_not_keep_failures() {
    let cache: OnceCache<&'static str, u32> = OnceCache::new();
    let err = cache
        .get_or_try_init(&"k", || async { Err(crate::error::Error::Cancelled) })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);

    let value = cache.get_or_try_init(&"k", || async { Ok(7) }).await.unwrap();
    assert_eq!(value, 7);
}
