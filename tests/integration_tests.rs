//! Integration tests using mock HTTP servers
//!
//! Each test builds a connector from a config document, exactly as the CLI
//! does, and drives it through the capability dispatch functions.

use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use solidafy_connectors::codec::encode_form;
use solidafy_connectors::connector::{
    dispatch, BatchRecord, BatchStatus, BatchWriteParams, BatchWriteType, Connector, ReadParams,
    RecordError,
};
use solidafy_connectors::pagination::parse_link_header;
use solidafy_connectors::subscribe::{sign_hex, VerificationParams, WebhookRequest};
use solidafy_connectors::{new_connector, ConnectorConfig, ErrorKind};
use std::collections::BTreeMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connector(provider: &str, server: &MockServer) -> Box<dyn Connector> {
    let yaml = format!(
        "provider: {provider}\nbase_url: {}\ncredentials:\n  type: bearer\n  token: test-token\n",
        server.uri()
    );
    new_connector(&ConnectorConfig::from_yaml_str(&yaml).unwrap()).unwrap()
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_read_preserves_raw_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{
                "id": "crd_1",
                "name": "Willy",
                "description": "",
                "updated_at": 1_715_626_085.049
            }],
            "_pagination": {"next": "https://host/contacts?page=2"}
        })))
        .mount(&server)
        .await;

    let front = connector("front", &server);
    let result = dispatch::read(front.as_ref(), &ReadParams::new("contacts", ["id", "name"]))
        .await
        .unwrap();

    assert_eq!(result.rows, 1);
    assert!(!result.done);
    assert_eq!(result.next_page, "https://host/contacts?page=2");

    let row = &result.data[0];
    assert_eq!(
        serde_json::to_value(&row.fields).unwrap(),
        json!({"id": "crd_1", "name": "Willy"})
    );
    assert_eq!(
        serde_json::to_value(&row.raw).unwrap(),
        json!({"id": "crd_1", "name": "Willy", "description": "", "updated_at": 1_715_626_085.049})
    );
}

#[tokio::test]
async fn test_unsupported_object_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let front = connector("front", &server);
    let err = dispatch::read(front.as_ref(), &ReadParams::new("invoices", ["id"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotSupportedForObject);

    let bigquery_yaml = format!(
        "provider: bigquery\nbase_url: {}\nmetadata:\n  project: p\n  dataset: d\n",
        server.uri()
    );
    let bigquery = new_connector(&ConnectorConfig::from_yaml_str(&bigquery_yaml).unwrap()).unwrap();
    let err = dispatch::list_object_metadata(bigquery.as_ref(), &["events".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapabilityNotSupported);
}

// ============================================================================
// Metadata
// ============================================================================

#[tokio::test]
async fn test_metadata_with_mixed_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tickets": [{"number": 1, "title": "Printer on fire", "priority": "high"}],
            "meta": {"pagination": {"next_page": null}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/email/mailboxes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"mailboxes": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/meme"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not found"})))
        .mount(&server)
        .await;

    let groove = connector("groove", &server);
    let objects = ["tickets", "mailboxes", "meme"].map(String::from);
    let result = dispatch::list_object_metadata(groove.as_ref(), &objects)
        .await
        .unwrap();

    let tickets = &result.result["tickets"];
    assert_eq!(
        tickets.fields_map,
        BTreeMap::from([
            ("number".to_string(), "Number".to_string()),
            ("priority".to_string(), "Priority".to_string()),
            ("title".to_string(), "Title".to_string()),
        ])
    );
    assert_eq!(result.errors["meme"].kind(), ErrorKind::ObjectNotSupported);
    assert_eq!(result.errors["mailboxes"].kind(), ErrorKind::MissingExpectedValues);
}

// ============================================================================
// Batch writes
// ============================================================================

#[tokio::test]
async fn test_batch_create_partial_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts/batch/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETE",
            "results": [
                {"id": "A", "properties": {"email": "a@example.com"}},
                {"id": "B", "properties": {"email": "b@example.com"}}
            ],
            "errors": [{"message": "validation failed on record 3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let batch = ["a@example.com", "b@example.com", "not-an-email"]
        .iter()
        .map(|email| BatchRecord::new(json!({"email": email}).as_object().cloned().unwrap()))
        .collect();
    let params = BatchWriteParams::new("contacts", BatchWriteType::Create, batch);

    let hubspot = connector("hubspot", &server);
    let result = dispatch::batch_write(hubspot.as_ref(), &params).await.unwrap();

    assert_eq!(result.status, BatchStatus::PartialSuccess);
    assert_eq!(result.results.len(), 3);
    assert!(result.results[0].success);
    assert_eq!(result.results[0].record_id.as_deref(), Some("A"));
    assert!(result.results[1].success);
    assert_eq!(result.results[1].record_id.as_deref(), Some("B"));
    assert!(!result.results[2].success);
    assert_eq!(result.results[2].errors, vec![RecordError::Unprocessed]);
    assert_eq!(result.errors, vec![json!({"message": "validation failed on record 3"})]);
}

// ============================================================================
// Webhooks
// ============================================================================

#[tokio::test]
async fn test_webhook_signature_mismatch() {
    let server = MockServer::start().await;
    let attio = connector("attio", &server);
    let body = br#"{"webhook_id":"w1","events":[{"event_type":"record.created"}]}"#;

    let mut headers = HeaderMap::new();
    let forged = sign_hex(b"other-secret", body).unwrap();
    headers.insert("attio-signature", HeaderValue::from_str(&forged).unwrap());
    let request = WebhookRequest::new(headers, body.to_vec());

    let err = dispatch::verify_webhook_message(
        attio.as_ref(),
        &request,
        &VerificationParams::new("signing-secret"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSignature);

    let mut headers = HeaderMap::new();
    let genuine = sign_hex(b"signing-secret", body).unwrap();
    headers.insert("attio-signature", HeaderValue::from_str(&genuine).unwrap());
    let request = WebhookRequest::new(headers, body.to_vec());
    assert!(dispatch::verify_webhook_message(
        attio.as_ref(),
        &request,
        &VerificationParams::new("signing-secret"),
    )
    .unwrap());
}

// ============================================================================
// Wire formats
// ============================================================================

#[test]
fn test_form_encoding_is_deterministic() {
    let payload = json!({
        "z": "last",
        "a": "first",
        "nil": null,
        "n": 10,
        "ss": ["x", "y"],
        "arr": ["v1", {"k": "v"}],
        "obj": {"hello": "world"}
    });

    let encoded = encode_form(&payload).unwrap();
    assert_eq!(encoded, encode_form(&payload).unwrap());

    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(encoded.as_bytes())
        .into_owned()
        .collect();
    pairs.sort();
    let expected: Vec<(String, String)> = [
        ("a", "first"),
        ("arr", "v1"),
        ("arr", r#"{"k":"v"}"#),
        ("n", "10"),
        ("obj", r#"{"hello":"world"}"#),
        ("ss", "x"),
        ("ss", "y"),
        ("z", "last"),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
    .collect();
    assert_eq!(pairs, expected);
    assert!(!encoded.contains("nil"));
}

#[tokio::test]
async fn test_link_header_pagination() {
    let header = r#"<https://host/api/v2/contacts?page=2>; rel="next", <https://host/api/v2/contacts?page=1>; rel="prev""#;
    assert_eq!(
        parse_link_header(header, "next").as_deref(),
        Some("https://host/api/v2/contacts?page=2")
    );
    assert_eq!(
        parse_link_header(r#"<https://host/api/v2/contacts?page=1>; rel="prev""#, "next"),
        None
    );

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/contacts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", header)
                .set_body_json(json!([{"id": 1, "name": "Ada"}])),
        )
        .mount(&server)
        .await;

    let freshdesk = connector("freshdesk", &server);
    let result = dispatch::read(freshdesk.as_ref(), &ReadParams::new("contacts", ["name"]))
        .await
        .unwrap();
    assert_eq!(result.next_page, "https://host/api/v2/contacts?page=2");
    assert!(!result.done);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/contacts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", r#"<https://host/api/v2/contacts?page=1>; rel="prev""#)
                .set_body_json(json!([{"id": 2, "name": "Grace"}])),
        )
        .mount(&server)
        .await;

    let freshdesk = connector("freshdesk", &server);
    let result = dispatch::read(freshdesk.as_ref(), &ReadParams::new("contacts", ["name"]))
        .await
        .unwrap();
    assert_eq!(result.next_page, "");
    assert!(result.done);
}
