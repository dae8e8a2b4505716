//! Tests for the components connector

use super::*;
use crate::auth::ClientBuilder;
use crate::connector::{
    Connector, ConnectorBase, ConnectorParams, DeleteParams, Deleter, ObjectMetadataReader,
    ReadParams, Reader, WriteParams, Writer,
};
use crate::error::ErrorKind;
use crate::pagination::{CursorPaginator, NextUrlPaginator};
use crate::read::{RowMarshaller, TimeFilter, TimeFormat};
use crate::schema::{
    embedded, parse_embedded, EmbeddedSchemas, EndpointRegistry, EndpointSupport, FieldsV1,
    Support,
};
use crate::types::{Capability, Method};
use crate::write::BodyEncoding;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::LazyLock;
use wiremock::matchers::{body_json, body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

static SCHEMAS: EmbeddedSchemas<FieldsV1> = LazyLock::new(|| {
    parse_embedded(
        "test",
        r#"{
            "modules": {
                "root": {
                    "id": "root",
                    "path": "",
                    "objects": {
                        "contacts": {
                            "displayName": "Contacts",
                            "path": "/contacts",
                            "responseKey": "_results",
                            "fields": {"id": "ID", "name": "Name"}
                        }
                    }
                }
            }
        }"#,
    )
});

fn base(server: &MockServer) -> ConnectorBase {
    let client = ClientBuilder::new().bearer("token").build().unwrap();
    ConnectorBase::new(
        ConnectorParams::new("front")
            .base_url(server.uri())
            .client(client),
    )
    .unwrap()
}

fn endpoints() -> EndpointRegistry {
    EndpointRegistry::root(vec![
        EndpointSupport::new("contacts", Support::ALL),
        EndpointSupport::new("{tickets,mailboxes,meme}", Support::READ),
    ])
    .unwrap()
}

fn connector(server: &MockServer) -> ComponentsConnector<FieldsV1> {
    ComponentsConnector::new(base(server), endpoints())
        .schemas(embedded(&SCHEMAS).unwrap())
        .with_read(
            ReadSpec::new(NextUrlPaginator::new("_pagination.next"))
                .page_size("limit", 50)
                .time_filter(TimeFilter::new("q[updated_after]", TimeFormat::UnixSeconds)),
        )
        .with_write(WriteSpec::new())
        .with_delete()
}

#[tokio::test]
async fn test_read_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("limit", "50"))
        .and(query_param("q[updated_after]", "1715558400"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{"id": "crd_1", "name": "Willy", "description": ""}],
            "_pagination": {"next": format!("{}/contacts?page_token=abc", server.uri())}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = ReadParams::new("contacts", ["id", "name"])
        .since(Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap());
    let result = connector(&server).read(&params).await.unwrap();

    assert_eq!(result.rows, 1);
    assert_eq!(result.data[0].fields.len(), 2);
    assert_eq!(result.data[0].raw["description"], json!(""));
    assert_eq!(result.next_page, format!("{}/contacts?page_token=abc", server.uri()));
}

#[tokio::test]
async fn test_read_follows_url_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("page_token", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{"id": "crd_2"}],
            "_pagination": {"next": null}
        })))
        .mount(&server)
        .await;

    let params = ReadParams::new("contacts", ["id"])
        .next_page(format!("{}/contacts?page_token=abc", server.uri()));
    let result = connector(&server).read(&params).await.unwrap();
    assert!(result.done);
    assert_eq!(result.data[0].id.as_deref(), Some("crd_2"));
}

#[tokio::test]
async fn test_read_gate_blocks_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = connector(&server)
        .read(&ReadParams::new("teammates", ["id"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotSupportedForObject);

    let err = connector(&server)
        .write(&WriteParams::create("tickets", json!({"subject": "hi"})))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotSupportedForObject);
}

#[tokio::test]
async fn test_read_not_found_is_unsupported_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meme"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = connector(&server)
        .read(&ReadParams::new("meme", ["id"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ObjectNotSupported);
}

#[tokio::test]
async fn test_bare_cursor_goes_in_token_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tickets": [{"id": 3}],
            "meta": {"next_cursor": ""}
        })))
        .mount(&server)
        .await;

    let connector: ComponentsConnector<FieldsV1> = ComponentsConnector::new(base(&server), endpoints())
        .with_read(
            ReadSpec::new(CursorPaginator::new("meta.next_cursor"))
                .token_param("cursor")
                .marshaller(RowMarshaller::new()),
        );
    let result = connector
        .read(&ReadParams::new("tickets", ["id"]).next_page("c2"))
        .await
        .unwrap();
    assert_eq!(result.rows, 1);
    assert!(result.done);
}

#[tokio::test]
async fn test_write_create_and_update() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .and(body_json(json!({"name": "Ada"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "crd_9", "name": "Ada"})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/contacts/crd_9"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let created = connector
        .write(&WriteParams::create("contacts", json!({"name": "Ada"})))
        .await
        .unwrap();
    assert_eq!(created.record_id.as_deref(), Some("crd_9"));

    let updated = connector
        .write(&WriteParams::update("contacts", "crd_9", json!({"name": "Ada L."})))
        .await
        .unwrap();
    assert!(updated.success);
    assert_eq!(updated.record_id.as_deref(), Some("crd_9"));
}

#[tokio::test]
async fn test_form_encoded_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts/crd_1"))
        .and(body_string("email=ada%40example.com&name=Ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "crd_1"})))
        .mount(&server)
        .await;

    let connector: ComponentsConnector<FieldsV1> = ComponentsConnector::new(base(&server), endpoints())
        .with_write(
            WriteSpec::new()
                .update_method(Method::POST)
                .encoding(BodyEncoding::Form),
        );
    let result = connector
        .write(&WriteParams::update(
            "contacts",
            "crd_1",
            json!({"name": "Ada", "email": "ada@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(result.record_id.as_deref(), Some("crd_1"));
}

#[tokio::test]
async fn test_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/contacts/crd_1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = connector(&server)
        .delete(&DeleteParams::new("contacts", "crd_1"))
        .await
        .unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn test_static_metadata() {
    let server = MockServer::start().await;
    let result = connector(&server)
        .list_object_metadata(&["contacts".to_string(), "nope".to_string()])
        .await
        .unwrap();

    assert_eq!(result.result["contacts"].fields_map["name"], "Name");
    assert_eq!(result.errors["nope"].kind(), ErrorKind::ObjectNotSupported);

    let err = connector(&server)
        .list_object_metadata(&[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingObjects);
}

#[tokio::test]
async fn test_composite_metadata_samples_unknown_objects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tickets": [{"id": 1, "subject": "Broken", "open": true}]
        })))
        .mount(&server)
        .await;

    let connector = connector(&server).metadata(MetadataSource::Composite);
    let result = connector
        .list_object_metadata(&["contacts".to_string(), "tickets".to_string()])
        .await
        .unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.result["contacts"].display_name, "Contacts");
    let tickets = &result.result["tickets"];
    assert_eq!(tickets.fields_map["subject"], "Subject");
    assert!(tickets.fields.as_ref().unwrap().contains_key("open"));
}

#[test]
fn test_capabilities_follow_specs() {
    let server_uri = "http://127.0.0.1:1";
    let client = ClientBuilder::new().bearer("token").build().unwrap();
    let base = ConnectorBase::new(
        ConnectorParams::new("groove")
            .base_url(server_uri)
            .client(client),
    )
    .unwrap();
    let connector: ComponentsConnector<FieldsV1> =
        ComponentsConnector::new(base, endpoints()).with_read(ReadSpec::new(NextUrlPaginator::new("next")));

    let capabilities: Vec<_> = connector.capabilities().into_iter().collect();
    assert_eq!(capabilities, vec![Capability::ObjectMetadata, Capability::Read]);
}
