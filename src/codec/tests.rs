//! Tests for the codec helpers

use super::*;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Contact {
    id: String,
    name: String,
}

#[test]
fn test_raw_json_preserves_unknown_fields() {
    let input = json!({
        "id": "crd_1",
        "name": "Willy",
        "description": "",
        "updated_at": 1_715_626_085.049
    });

    let parsed: RawJson<Contact> = serde_json::from_value(input.clone()).unwrap();
    assert_eq!(parsed.name, "Willy");
    assert_eq!(parsed.raw().len(), 4);

    let output = serde_json::to_value(&parsed).unwrap();
    assert_eq!(output, input);
}

#[test]
fn test_raw_json_typed_view_wins() {
    let input = json!({"id": "1", "name": "old", "extra": {"nested": true}});
    let mut parsed: RawJson<Contact> = serde_json::from_value(input).unwrap();
    parsed.name = "new".to_string();

    let output = serde_json::to_value(&parsed).unwrap();
    assert_eq!(
        output,
        json!({"id": "1", "name": "new", "extra": {"nested": true}})
    );
}

#[test]
fn test_raw_json_rejects_non_object() {
    let result: Result<RawJson<Contact>, _> = serde_json::from_value(json!([1, 2]));
    assert!(result.is_err());
}

#[derive(Debug, Serialize)]
struct Attributes {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "referenceId")]
    reference_id: String,
}

#[derive(Debug, Serialize)]
struct Decoration {
    attributes: Attributes,
}

#[test]
fn test_decorated_record_flattens_extension() {
    let record = json!({"Name": "Acme", "attributes": "overwritten"})
        .as_object()
        .cloned()
        .unwrap();
    let decorated = DecoratedRecord::new(
        record,
        Decoration {
            attributes: Attributes {
                kind: "Account".to_string(),
                reference_id: "ref0".to_string(),
            },
        },
    );

    let output = serde_json::to_value(&decorated).unwrap();
    assert_eq!(
        output,
        json!({
            "Name": "Acme",
            "attributes": {"type": "Account", "referenceId": "ref0"}
        })
    );
}

#[test]
fn test_encode_form_sorted_and_deterministic() {
    let input = json!({
        "z": "last",
        "a": "first",
        "nil": null,
        "n": 10,
        "ss": ["x", "y"],
        "arr": ["v1", {"k": "v"}],
        "obj": {"hello": "world"}
    });

    let encoded = encode_form(&input).unwrap();
    assert_eq!(encoded, encode_form(&input).unwrap());
    assert!(!encoded.contains("nil"));

    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(encoded.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
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
}

#[test]
fn test_encode_form_requires_object() {
    assert!(encode_form(&json!("plain")).is_err());
}

#[test]
fn test_flatten_nested_fields() {
    let record = json!({
        "id": "01H",
        "type": "profile",
        "attributes": {"email": "a@b.co", "id": "shadowed"}
    })
    .as_object()
    .cloned()
    .unwrap();

    let flat = flatten_nested_fields(&record, "attributes");
    assert_eq!(
        serde_json::Value::Object(flat),
        json!({"id": "01H", "type": "profile", "email": "a@b.co"})
    );

    let untouched = flatten_nested_fields(&record, "missing");
    assert_eq!(untouched, record);
}

#[test]
fn test_nested_value() {
    let record = json!({"id": {"workspace_id": "w", "record_id": "r1"}, "name": "n"})
        .as_object()
        .cloned()
        .unwrap();

    assert_eq!(nested_value(&record, "id.record_id"), Some(&json!("r1")));
    assert_eq!(nested_value(&record, "name"), Some(&json!("n")));
    assert_eq!(nested_value(&record, "id.nope"), None);
}
