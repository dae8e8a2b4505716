//! Tests for pagination module

use super::*;
use crate::types::{JsonValue, Record};
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use test_case::test_case;

fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            json!({"id": format!("r{i}")})
                .as_object()
                .unwrap()
                .clone()
        })
        .collect()
}

fn ctx<'a>(
    request_url: &'a str,
    current_token: &'a str,
    body: &'a JsonValue,
    headers: &'a HeaderMap,
    records: &'a [Record],
) -> PageContext<'a> {
    PageContext {
        request_url,
        current_token,
        body: Some(body),
        headers,
        records,
    }
}

// ============================================================================
// NextPage Tests
// ============================================================================

#[test]
fn test_next_page_into_token() {
    assert_eq!(NextPage::Url("https://h/p2".into()).into_token(), "https://h/p2");
    assert_eq!(NextPage::Token("abc".into()).into_token(), "abc");
    assert_eq!(NextPage::Token(String::new()).into_token(), "");
    assert_eq!(NextPage::Done.into_token(), "");
    assert!(NextPage::Done.is_done());
}

// ============================================================================
// Link Header Tests
// ============================================================================

#[test]
fn test_parse_link_header_next_and_prev() {
    let header = r#"<https://host/api/v2/contacts?page=2>; rel="next", <https://host/api/v2/contacts?page=1>; rel="prev""#;
    assert_eq!(
        parse_link_header(header, "next"),
        Some("https://host/api/v2/contacts?page=2".to_string())
    );
    assert_eq!(
        parse_link_header(header, "prev"),
        Some("https://host/api/v2/contacts?page=1".to_string())
    );
}

#[test_case(r#"<https://host/c?page=1>; rel="prev""# ; "only prev")]
#[test_case("" ; "empty header")]
#[test_case("garbage" ; "no brackets")]
fn test_parse_link_header_without_next(header: &str) {
    assert_eq!(parse_link_header(header, "next"), None);
}

#[test]
fn test_parse_link_header_tolerates_commas_and_multi_rel() {
    let header = r#"<https://host/c?ids=1,2&page=3>; title="a"; rel="next last""#;
    assert_eq!(
        parse_link_header(header, "next"),
        Some("https://host/c?ids=1,2&page=3".to_string())
    );
}

#[test]
fn test_link_header_paginator() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "link",
        HeaderValue::from_static(r#"<https://host/api/v2/contacts?page=2>; rel="next""#),
    );
    let body = json!([]);
    let page = records(2);

    let next = LinkHeaderPaginator::default()
        .next_page(&ctx("https://host/api/v2/contacts", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(next, NextPage::Url("https://host/api/v2/contacts?page=2".into()));

    let empty = HeaderMap::new();
    let next = LinkHeaderPaginator::default()
        .next_page(&ctx("https://host/api/v2/contacts", "", &body, &empty, &page))
        .unwrap();
    assert!(next.is_done());
}

// ============================================================================
// Cursor Tests
// ============================================================================

#[test]
fn test_cursor_as_bare_token() {
    let body = json!({"paging": {"next": {"after": "395"}}});
    let headers = HeaderMap::new();
    let page = records(1);

    let next = CursorPaginator::new("paging.next.after")
        .next_page(&ctx("https://h/objects", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(next, NextPage::Token("395".into()));
}

#[test]
fn test_cursor_as_query_param() {
    let body = json!({"meta": {"cursor": "c2"}});
    let headers = HeaderMap::new();
    let page = records(1);

    let next = CursorPaginator::new("meta.cursor")
        .with_param("cursor")
        .next_page(&ctx("https://h/items?limit=5&cursor=c1", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(next, NextPage::Url("https://h/items?limit=5&cursor=c2".into()));
}

#[test]
fn test_cursor_missing_or_stopped() {
    let headers = HeaderMap::new();
    let page = records(1);

    let body = json!({"paging": {}});
    let next = CursorPaginator::new("paging.next.after")
        .next_page(&ctx("https://h/o", "", &body, &headers, &page))
        .unwrap();
    assert!(next.is_done());

    let body = json!({"cursor": "x", "has_more": false});
    let next = CursorPaginator::new("cursor")
        .with_stop_condition(StopCondition::field("has_more", false))
        .next_page(&ctx("https://h/o", "", &body, &headers, &page))
        .unwrap();
    assert!(next.is_done());
}

#[test]
fn test_empty_page_stops_cursor() {
    let body = json!({"cursor": "x"});
    let headers = HeaderMap::new();
    let next = CursorPaginator::new("cursor")
        .next_page(&ctx("https://h/o", "", &body, &headers, &[]))
        .unwrap();
    assert!(next.is_done());
}

// ============================================================================
// Offset Tests
// ============================================================================

#[test]
fn test_offset_token_advances_by_records() {
    let body = json!({"total": 10});
    let headers = HeaderMap::new();
    let page = records(3);
    let paginator = OffsetPaginator::new(3).with_stop_condition(StopCondition::total_count("total"));

    let next = paginator
        .next_page(&ctx("https://h/q", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(next, NextPage::Token("3".into()));

    let next = paginator
        .next_page(&ctx("https://h/q", "6", &body, &headers, &page))
        .unwrap();
    assert_eq!(next, NextPage::Token("9".into()));

    let last = records(1);
    let next = paginator
        .next_page(&ctx("https://h/q", "9", &body, &headers, &last))
        .unwrap();
    assert!(next.is_done());
}

#[test]
fn test_offset_stale_total_with_empty_page_is_done() {
    let body = json!({"total": 500});
    let headers = HeaderMap::new();
    let paginator = OffsetPaginator::new(50).with_stop_condition(StopCondition::total_count("total"));

    let next = paginator
        .next_page(&ctx("https://h/q", "100", &body, &headers, &[]))
        .unwrap();
    assert!(next.is_done());
}

#[test]
fn test_offset_query_param_and_short_page() {
    let body = json!([]);
    let headers = HeaderMap::new();
    let paginator = OffsetPaginator::new(2).with_param("offset");

    let page = records(2);
    let next = paginator
        .next_page(&ctx("https://h/q?offset=4&limit=2", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(next, NextPage::Url("https://h/q?limit=2&offset=6".into()));

    let short = records(1);
    let next = paginator
        .next_page(&ctx("https://h/q?offset=6&limit=2", "", &body, &headers, &short))
        .unwrap();
    assert!(next.is_done());
}

// ============================================================================
// Page Number / Last Id / Next URL Tests
// ============================================================================

#[test]
fn test_page_number() {
    let body = json!([]);
    let headers = HeaderMap::new();
    let page = records(2);
    let paginator = PageNumberPaginator::new("page", 1).with_page_size(2);

    let next = paginator
        .next_page(&ctx("https://h/tickets", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(next, NextPage::Url("https://h/tickets?page=2".into()));

    let next = paginator
        .next_page(&ctx("https://h/tickets?page=2", "", &body, &headers, &records(1)))
        .unwrap();
    assert!(next.is_done());
}

#[test]
fn test_last_id_with_has_more() {
    let headers = HeaderMap::new();
    let page = records(3);
    let paginator = LastIdPaginator::new("id", "starting_after")
        .with_stop_condition(StopCondition::field("has_more", false));

    let body = json!({"has_more": true});
    let next = paginator
        .next_page(&ctx("https://h/v1/customers?limit=3", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(
        next,
        NextPage::Url("https://h/v1/customers?limit=3&starting_after=r2".into())
    );

    let body = json!({"has_more": false});
    let next = paginator
        .next_page(&ctx("https://h/v1/customers?limit=3", "", &body, &headers, &page))
        .unwrap();
    assert!(next.is_done());
}

#[test]
fn test_next_url_absolute_and_relative() {
    let headers = HeaderMap::new();
    let page = records(1);

    let body = json!({"_pagination": {"next": "https://host/contacts?page=2"}});
    let next = NextUrlPaginator::new("_pagination.next")
        .next_page(&ctx("https://host/contacts", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(next, NextPage::Url("https://host/contacts?page=2".into()));

    let body = json!({"links": {"next": "/api/profiles?page[cursor]=abc"}});
    let next = NextUrlPaginator::new("links.next")
        .next_page(&ctx("https://a.example.com/api/profiles", "", &body, &headers, &page))
        .unwrap();
    assert_eq!(
        next.into_token(),
        "https://a.example.com/api/profiles?page[cursor]=abc"
    );

    let body = json!({"links": {"next": null}});
    let next = NextUrlPaginator::new("links.next")
        .next_page(&ctx("https://a.example.com/api/profiles", "", &body, &headers, &page))
        .unwrap();
    assert!(next.is_done());
}

#[test]
fn test_no_paginator() {
    let body = json!({});
    let headers = HeaderMap::new();
    let page = records(5);
    assert!(NoPaginator
        .next_page(&ctx("https://h/x", "", &body, &headers, &page))
        .unwrap()
        .is_done());
}
