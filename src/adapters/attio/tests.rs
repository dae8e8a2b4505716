//! Tests for the Attio adapter

use super::*;
use crate::auth::ClientBuilder;
use crate::connector::{
    ConnectorBase, ConnectorParams, DeleteParams, Deleter, ObjectMetadataReader, ReadParams,
    Reader, Subscriber, WebhookVerifier, WriteParams, Writer,
};
use crate::error::ErrorKind;
use crate::schema::ValueType;
use crate::subscribe::{
    sign_hex, EventType, SubscribeParams, SubscriptionEvent, SubscriptionStatus,
    SubscriptionUpdateEvent, VerificationParams, WebhookRequest,
};
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use test_case::test_case;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connector(server: &MockServer) -> AttioConnector {
    let client = ClientBuilder::new().bearer("token").build().unwrap();
    let base = ConnectorBase::new(
        ConnectorParams::new("attio")
            .base_url(server.uri())
            .client(client),
    )
    .unwrap();
    AttioConnector::new(base).unwrap()
}

fn person(record_id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": {"workspace_id": "ws_1", "object_id": "obj_people", "record_id": record_id},
        "values": {"name": [{"value": name}]}
    })
}

#[tokio::test]
async fn test_read_pages_by_offset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/objects/people/records/query"))
        .and(body_json(json!({"limit": 2, "offset": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [person("r1", "Ada"), person("r2", "Grace")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/objects/people/records/query"))
        .and(body_json(json!({"limit": 2, "offset": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [person("r3", "Edsger")]
        })))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let params = ReadParams::new("people", ["name"]).page_size(2);
    let first = connector.read(&params).await.unwrap();
    assert_eq!(first.rows, 2);
    assert_eq!(first.data[0].id.as_deref(), Some("r1"));
    assert!(first.data[0].fields.contains_key("name"));
    assert_eq!(first.next_page, "2");

    let second = connector
        .read(&params.clone().next_page(first.next_page))
        .await
        .unwrap();
    assert_eq!(second.rows, 1);
    assert!(second.done);
}

#[tokio::test]
async fn test_read_rejects_non_numeric_token() {
    let server = MockServer::start().await;
    let err = connector(&server)
        .read(&ReadParams::new("people", ["name"]).next_page("abc"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[tokio::test]
async fn test_write_wraps_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/objects/people/records"))
        .and(body_json(json!({"data": {"values": {"name": "Ada"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": person("r9", "Ada")})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v2/objects/people/records/r9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": person("r9", "Ada L.")})))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let created = connector
        .write(&WriteParams::create("people", json!({"name": "Ada"})))
        .await
        .unwrap();
    assert_eq!(created.record_id.as_deref(), Some("r9"));

    let updated = connector
        .write(&WriteParams::update("people", "r9", json!({"name": "Ada L."})))
        .await
        .unwrap();
    assert!(updated.success);
    assert_eq!(updated.record_id.as_deref(), Some("r9"));
}

#[tokio::test]
async fn test_delete_record() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/objects/deals/records/r5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let result = connector(&server)
        .delete(&DeleteParams::new("deals", "r5"))
        .await
        .unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn test_metadata_from_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/objects/people/attributes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"api_slug": "name", "title": "Name", "type": "personal-name", "is_writable": true},
                {"api_slug": "email_addresses", "title": "Email addresses", "type": "email-address",
                 "is_required": false, "is_writable": true},
                {"api_slug": "created_at", "title": "Created at", "type": "timestamp", "is_writable": false}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/objects/nope/attributes"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = connector(&server)
        .list_object_metadata(&["people".to_string(), "nope".to_string()])
        .await
        .unwrap();

    let people = &result.result["people"];
    assert_eq!(people.fields_map["email_addresses"], "Email addresses");
    let fields = people.fields.as_ref().unwrap();
    assert_eq!(fields["created_at"].value_type, ValueType::DateTime);
    assert_eq!(fields["created_at"].read_only, Some(true));
    assert_eq!(result.errors["nope"].kind(), ErrorKind::ObjectNotSupported);
}

#[test_case("checkbox", false, ValueType::Boolean; "checkbox")]
#[test_case("currency", false, ValueType::Float; "currency")]
#[test_case("rating", false, ValueType::Int; "rating")]
#[test_case("date", false, ValueType::Date; "date")]
#[test_case("status", false, ValueType::SingleSelect; "status")]
#[test_case("select", true, ValueType::MultiSelect; "multiselect")]
#[test_case("domain", false, ValueType::String; "domain")]
#[test_case("record-reference", false, ValueType::Other; "reference")]
fn test_attribute_types(kind: &str, multiselect: bool, expected: ValueType) {
    let attribute = json!({
        "api_slug": "field",
        "type": kind,
        "is_multiselect": multiselect,
        "id": {"attribute_id": "attr_1"}
    });
    let (slug, metadata) = attribute_metadata(attribute.as_object().unwrap()).unwrap();
    assert_eq!(slug, "field");
    assert_eq!(metadata.value_type, expected);
    assert_eq!(metadata.provider_type, kind);
    assert_eq!(metadata.field_id.as_deref(), Some("attr_1"));
}

#[tokio::test]
async fn test_subscribe_resolves_object_id_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/objects/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": {"workspace_id": "ws_1", "object_id": "obj_people"}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/webhooks"))
        .and(body_json(json!({
            "data": {
                "target_url": "https://hooks.example.com/attio",
                "subscriptions": [
                    {"event_type": "record.created",
                     "filter": {"$and": [{"field": "id.object_id", "operator": "equals", "value": "obj_people"}]}},
                    {"event_type": "record.updated",
                     "filter": {"$and": [{"field": "id.object_id", "operator": "equals", "value": "obj_people"}]}}
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": {"workspace_id": "ws_1", "webhook_id": "wh_1"}, "status": "active"}
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/webhooks/wh_1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server);
    let params = SubscribeParams::new("https://hooks.example.com/attio")
        .object("people", [EventType::Create, EventType::Update]);

    let result = connector.subscribe(&params).await.unwrap();
    assert_eq!(result.registrations.len(), 1);
    assert_eq!(result.registrations[0].id, "wh_1");
    assert_eq!(
        result.registrations[0].provider_events,
        vec!["record.created", "record.updated"]
    );

    // Second subscription reuses the cached object id
    connector.subscribe(&params).await.unwrap();

    connector.delete_subscription(&result).await.unwrap();
}

async fn mount_objects(server: &MockServer) {
    for object in ["people", "companies"] {
        Mock::given(method("GET"))
            .and(path(format!("/v2/objects/{object}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": {"workspace_id": "ws_1", "object_id": format!("obj_{object}")}}
            })))
            .mount(server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/v2/webhooks"))
        .and(body_string_contains("obj_people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": {"workspace_id": "ws_1", "webhook_id": "wh_people"}}
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/webhooks"))
        .and(body_string_contains("obj_companies"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
        .mount(server)
        .await;
}

fn people_and_companies() -> SubscribeParams {
    SubscribeParams::new("https://hooks.example.com/attio")
        .object("people", [EventType::Create])
        .object("companies", [EventType::Create])
}

#[tokio::test]
async fn test_failed_subscribe_removes_registered_webhooks() {
    let server = MockServer::start().await;
    mount_objects(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/v2/webhooks/wh_people"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let err = connector(&server)
        .subscribe(&people_and_companies())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[tokio::test]
async fn test_failed_subscribe_returns_webhooks_it_could_not_remove() {
    let server = MockServer::start().await;
    mount_objects(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/v2/webhooks/wh_people"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = connector(&server)
        .subscribe(&people_and_companies())
        .await
        .unwrap();
    assert_eq!(result.status, SubscriptionStatus::Failed);
    assert_eq!(result.registrations.len(), 1);
    assert_eq!(result.registrations[0].id, "wh_people");
    assert_eq!(result.registrations[0].object_name, "people");
}

#[tokio::test]
async fn test_subscribe_rejects_custom_objects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let params = SubscribeParams::new("https://hooks.example.com/attio")
        .object("projects", [EventType::Create]);
    let err = connector(&server).subscribe(&params).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotSupportedForObject);
}

#[tokio::test]
async fn test_verify_webhook() {
    let server = MockServer::start().await;
    let connector = connector(&server);
    let body = br#"{"webhook_id":"wh_1","events":[]}"#;
    let signature = sign_hex(b"shh", body).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert("attio-signature", HeaderValue::from_str(&signature).unwrap());
    let request = WebhookRequest::new(headers, body.to_vec());

    assert!(connector
        .verify_webhook_message(&request, &VerificationParams::new("shh"))
        .unwrap());
    let err = connector
        .verify_webhook_message(&request, &VerificationParams::new("other"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSignature);
}

#[test]
fn test_parse_delivery() {
    let body = br#"{
        "webhook_id": "wh_1",
        "events": [{
            "event_type": "record.updated",
            "id": {"workspace_id": "ws_1", "object_id": "obj_people", "record_id": "r1", "attribute_id": "attr_9"},
            "actor": {"type": "workspace-member", "id": "m_1"}
        }]
    }"#;
    let events = parse_delivery(body).unwrap();
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event.event_type().unwrap(), EventType::Update);
    assert_eq!(event.raw_event_name().unwrap(), "record.updated");
    assert_eq!(event.object_name().unwrap(), "obj_people");
    assert_eq!(event.workspace().unwrap(), "ws_1");
    assert_eq!(event.record_id().unwrap(), "r1");
    assert_eq!(event.updated_fields().unwrap(), vec!["attr_9"]);
    assert_eq!(event.raw()["actor"]["id"], json!("m_1"));
    assert_eq!(
        event.event_timestamp_nanos().unwrap_err().kind(),
        ErrorKind::MissingExpectedValues
    );

    assert!(parse_delivery(b"not json").is_err());
}
