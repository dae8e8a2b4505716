//! Schema registry, endpoint registry and inference tests

use super::*;
use crate::error::ErrorKind;
use crate::providers::ModuleId;
use crate::types::{Operation, Record};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeSet;
use test_case::test_case;

const V1_SCHEMAS: &str = r#"{
  "modules": {
    "root": {
      "id": "root",
      "path": "/api/v2",
      "objects": {
        "contacts": {
          "displayName": "Contacts",
          "path": "/contacts",
          "responseKey": "_results",
          "fields": { "id": "ID", "name": "Name" }
        },
        "tags": {
          "displayName": "Tags",
          "path": "tags",
          "responseKey": "",
          "fields": { "id": "ID" },
          "docsURL": "https://docs.example.com/tags"
        }
      }
    },
    "assets": {
      "path": "",
      "objects": {
        "files": { "displayName": "Files", "path": "/files", "fields": {} }
      }
    }
  }
}"#;

const V2_SCHEMAS: &str = r#"{
  "modules": {
    "": {
      "path": "/v3",
      "objects": {
        "deals": {
          "displayName": "Deals",
          "path": "/deals",
          "responseKey": "results",
          "fields": {
            "amount": { "displayName": "Amount", "valueType": "float", "providerType": "number" },
            "stage": {
              "displayName": "Stage",
              "valueType": "singleSelect",
              "providerType": "enumeration",
              "values": [{ "value": "won", "displayValue": "Won" }]
            }
          }
        }
      }
    }
  }
}"#;

fn v1() -> SchemaRegistry<FieldsV1> {
    SchemaRegistry::from_json(V1_SCHEMAS).unwrap()
}

// ============================================================================
// Static Registry Tests
// ============================================================================

#[test]
fn test_select_reports_unknown_objects_per_object() {
    let result = v1()
        .select(
            &ModuleId::new(""),
            &["contacts".to_string(), "meme".to_string()],
        )
        .unwrap();

    let contacts = &result.result["contacts"];
    assert_eq!(contacts.display_name, "Contacts");
    assert_eq!(contacts.fields_map["name"], "Name");
    assert!(contacts.fields.is_none());

    assert_eq!(result.errors["meme"].kind(), ErrorKind::ObjectNotSupported);
}

#[test]
fn test_select_requires_objects() {
    let err = v1().select(&ModuleId::root(), &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingObjects);
}

#[test]
fn test_select_one_and_unknown_module() {
    let registry = v1();
    assert!(registry.select_one(&ModuleId::root(), "tags").is_ok());

    let err = registry.select_one(&ModuleId::root(), "files").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ObjectNotSupported);

    let err = registry
        .select_one(&ModuleId::new("marketing"), "files")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedModule);
}

#[test]
fn test_lookup_url_path_joins_module_and_object() {
    let registry = v1();
    assert_eq!(
        registry.lookup_url_path(&ModuleId::root(), "contacts").unwrap(),
        "/api/v2/contacts"
    );
    assert_eq!(
        registry.lookup_url_path(&ModuleId::root(), "tags").unwrap(),
        "/api/v2/tags"
    );
    assert_eq!(
        registry
            .lookup_url_path(&ModuleId::new("assets"), "files")
            .unwrap(),
        "/files"
    );
}

#[test]
fn test_lookup_array_field_name() {
    let registry = v1();
    assert_eq!(
        registry
            .lookup_array_field_name(&ModuleId::root(), "contacts")
            .unwrap(),
        "_results"
    );
    assert_eq!(
        registry
            .lookup_array_field_name(&ModuleId::root(), "tags")
            .unwrap(),
        ""
    );
}

#[test]
fn test_object_names_aliases_root() {
    let names = v1().object_names();
    let root: BTreeSet<String> = ["contacts", "tags"].iter().map(|s| s.to_string()).collect();
    assert_eq!(names[""], root);
    assert_eq!(names["root"], root);
    assert!(names["assets"].contains("files"));
}

#[test]
fn test_v2_fields_and_module_canonicalization() {
    let registry: SchemaRegistry<FieldsV2> = SchemaRegistry::from_json(V2_SCHEMAS).unwrap();
    let deals = registry.select_one(&ModuleId::root(), "deals").unwrap();

    assert_eq!(deals.fields_map["amount"], "Amount");
    let fields = deals.fields.unwrap();
    assert_eq!(fields["amount"].value_type, ValueType::Float);
    assert_eq!(fields["stage"].values.as_ref().unwrap()[0].display_value, "Won");

    let module = &registry.metadata().modules[&ModuleId::root()];
    assert!(module.id.is_root());
}

#[test]
fn test_list_result_serializes_errors_as_messages() {
    let result = v1()
        .select(&ModuleId::root(), &["meme".to_string()])
        .unwrap();
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["errors"]["meme"], json!("object not supported: meme"));
}

// ============================================================================
// Endpoint Registry Tests
// ============================================================================

#[test_case("contacts", &["contacts"] ; "no braces")]
#[test_case("{contacts,companies}", &["contacts", "companies"] ; "single group")]
#[test_case("crm/{a,b}/{x,y}", &["crm/a/x", "crm/a/y", "crm/b/x", "crm/b/y"] ; "two groups")]
#[test_case("{a,{b,c}}", &["a", "b", "c"] ; "nested group")]
fn test_expand_braces(pattern: &str, expected: &[&str]) {
    assert_eq!(expand_braces(pattern).unwrap(), expected);
}

#[test]
fn test_expand_braces_unbalanced() {
    assert_eq!(
        expand_braces("{a,b").unwrap_err().kind(),
        ErrorKind::Config
    );
    assert!(expand_braces("a}").is_err());
}

fn endpoints() -> EndpointRegistry {
    EndpointRegistry::root(vec![
        EndpointSupport::new("{contacts,companies}", Support::READ.union(Support::WRITE)),
        EndpointSupport::new("contacts", Support::DELETE),
        EndpointSupport::new("reports/*", Support::READ),
    ])
    .unwrap()
}

#[test]
fn test_endpoint_support_unions_matching_patterns() {
    let registry = endpoints();
    let root = ModuleId::root();

    let contacts = registry.support(&root, "contacts");
    assert!(contacts.read && contacts.write && contacts.delete);
    assert!(!contacts.subscribe);

    assert!(registry.is_supported(&root, "companies", Operation::Write));
    assert!(!registry.is_supported(&root, "companies", Operation::Delete));
    assert!(registry.is_supported(&root, "reports/weekly", Operation::Read));
    assert!(!registry.is_supported(&root, "reports", Operation::Read));
}

#[test]
fn test_endpoint_objects_listing() {
    let objects = endpoints().objects(&ModuleId::root());
    let names: Vec<_> = objects.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["companies", "contacts", "reports/*"]);
    assert!(objects["contacts"].delete);
    assert!(!objects["companies"].delete);
    assert!(endpoints().objects(&ModuleId::new("other")).is_empty());
}

#[test]
fn test_endpoint_check_fails_fast() {
    let registry = endpoints();
    let err = registry
        .check(&ModuleId::root(), "invoices", Operation::Read)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotSupportedForObject);
    assert_eq!(
        err.to_string(),
        "operation 'read' not supported for object 'invoices'"
    );

    let err = registry
        .check(&ModuleId::new("other"), "contacts", Operation::Read)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotSupportedForObject);
}

// ============================================================================
// Inference Tests
// ============================================================================

fn record(value: serde_json::Value) -> Record {
    value.as_object().unwrap().clone()
}

#[test]
fn test_infer_value_types() {
    let inferrer = FieldInferrer::new();
    assert_eq!(inferrer.value_type(&json!(null)), None);
    assert_eq!(inferrer.value_type(&json!(true)), Some(ValueType::Boolean));
    assert_eq!(inferrer.value_type(&json!(3)), Some(ValueType::Int));
    assert_eq!(inferrer.value_type(&json!(1.5)), Some(ValueType::Float));
    assert_eq!(
        inferrer.value_type(&json!("2024-05-13T18:48:05Z")),
        Some(ValueType::DateTime)
    );
    assert_eq!(inferrer.value_type(&json!("2024-05-13")), Some(ValueType::Date));
    assert_eq!(inferrer.value_type(&json!("hello")), Some(ValueType::String));
    assert_eq!(inferrer.value_type(&json!({"a": 1})), Some(ValueType::Other));

    let plain = FieldInferrer::new().with_date_detection(false);
    assert_eq!(plain.value_type(&json!("2024-05-13")), Some(ValueType::String));
}

#[test]
fn test_infer_fields_merges_records() {
    let records = vec![
        record(json!({"id": 1, "score": 2, "note": null, "created_at": "2024-01-01"})),
        record(json!({"id": 2, "score": 2.5, "note": "x", "created_at": "2024-01-02T10:00:00Z"})),
    ];

    let fields = FieldInferrer::new().infer_fields(&records);
    assert_eq!(fields["id"].value_type, ValueType::Int);
    assert_eq!(fields["score"].value_type, ValueType::Float);
    assert_eq!(fields["note"].value_type, ValueType::String);
    assert_eq!(fields["note"].provider_type, "string");
    assert_eq!(fields["created_at"].value_type, ValueType::DateTime);
    assert_eq!(fields["created_at"].display_name, "Created At");
}

#[test]
fn test_infer_object_requires_records() {
    let err = infer_object_metadata("mailboxes", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingExpectedValues);

    let metadata = infer_object_metadata("tickets", &[record(json!({"id": 7}))]).unwrap();
    assert_eq!(metadata.display_name, "Tickets");
    assert_eq!(metadata.fields_map["id"], "Id");
}
