//! Tests for subscriptions and webhook verification

use super::*;
use crate::error::ErrorKind;
use base64::Engine;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};

fn mapping() -> EventMapping {
    EventMapping::new()
        .event("companies", EventType::Create, &["record.created"])
        .event("companies", EventType::Update, &["record.updated"])
        .event("notes", EventType::Create, &["note.created", "note-content.created"])
}

fn signed_request(header: &str, value: &str, body: &'static str) -> WebhookRequest {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::HeaderName::from_bytes(header.as_bytes()).unwrap(),
        HeaderValue::from_str(value).unwrap(),
    );
    WebhookRequest::new(headers, body)
}

#[test]
fn test_plan_expands_provider_events() {
    let params = SubscribeParams::new("https://hooks.example.com/in")
        .object("companies", [EventType::Create, EventType::Update])
        .object("notes", [EventType::Create]);

    let planned = mapping().plan(&params).unwrap();
    let names: Vec<_> = planned.iter().map(|p| p.provider_event.as_str()).collect();
    assert_eq!(
        names,
        vec!["record.created", "record.updated", "note.created", "note-content.created"]
    );
}

#[test]
fn test_plan_rejects_unsupported_pair() {
    let params = SubscribeParams::new("https://hooks.example.com/in")
        .object("companies", [EventType::Delete]);
    let err = mapping().plan(&params).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedSubscriptionEvent);
    assert_eq!(
        err.to_string(),
        "unsupported subscription event 'delete' for object 'companies'"
    );

    let err = mapping()
        .plan(&SubscribeParams::new("https://hooks.example.com/in"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingObjects);
}

#[test]
fn test_event_type_reverse_lookup() {
    let mapping = mapping();
    assert_eq!(mapping.event_type("record.updated"), EventType::Update);
    assert_eq!(mapping.event_type("note-content.created"), EventType::Create);
    assert_eq!(mapping.event_type("list-entry.created"), EventType::Other);
}

#[test]
fn test_verify_hex_signature() {
    let body = r#"{"events":[]}"#;
    let signature = sign_hex(b"shh", body.as_bytes()).unwrap();
    let request = signed_request("attio-signature", &signature, body);

    let verifier = HmacVerifier::new("Attio-Signature");
    assert!(verifier
        .verify(&request, &VerificationParams::new("shh"))
        .unwrap());
}

#[test]
fn test_verify_rejects_other_secret() {
    let body = r#"{"events":[]}"#;
    let signature = sign_hex(b"other-secret", body.as_bytes()).unwrap();
    let request = signed_request("attio-signature", &signature, body);

    let err = HmacVerifier::new("attio-signature")
        .verify(&request, &VerificationParams::new("shh"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSignature);
}

#[test]
fn test_verify_missing_and_malformed_header() {
    let verifier = HmacVerifier::new("x-signature");
    let params = VerificationParams::new("shh");

    let request = WebhookRequest::new(HeaderMap::new(), "body");
    assert_eq!(
        verifier.verify(&request, &params).unwrap_err().kind(),
        ErrorKind::MissingSignature
    );

    let request = signed_request("x-signature", "not-hex!", "body");
    assert_eq!(
        verifier.verify(&request, &params).unwrap_err().kind(),
        ErrorKind::InvalidSignature
    );
}

#[test]
fn test_verify_empty_secret() {
    let verifier = HmacVerifier::new("x-signature");
    let params = VerificationParams::new("");

    let request = WebhookRequest::new(HeaderMap::new(), "body");
    assert_eq!(
        verifier.verify(&request, &params).unwrap_err().kind(),
        ErrorKind::MissingSignature
    );

    let signature = sign_hex(b"", b"body").unwrap();
    let request = signed_request("x-signature", &signature, "body");
    assert_eq!(
        verifier.verify(&request, &params).unwrap_err().kind(),
        ErrorKind::InvalidSignature
    );
}

#[test]
fn test_verify_base64_with_prefix() {
    let body = "payload";
    let hex_sig = sign_hex(b"shh", body.as_bytes()).unwrap();
    let raw = hex::decode(hex_sig).unwrap();
    let encoded = format!(
        "sha256={}",
        base64::engine::general_purpose::STANDARD.encode(raw)
    );
    let request = signed_request("x-hub-signature", &encoded, body);

    let verifier = HmacVerifier::new("x-hub-signature")
        .encoding(SignatureEncoding::Base64)
        .prefix("sha256=");
    assert!(verifier
        .verify(&request, &VerificationParams::new("shh"))
        .unwrap());
}

#[test]
fn test_verification_params_debug_redacts() {
    let debug = format!("{:?}", VerificationParams::new("top-secret"));
    assert!(!debug.contains("top-secret"));
}
