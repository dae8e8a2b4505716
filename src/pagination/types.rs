//! Pagination types and traits
//!
//! A read returns an opaque next-page token. Strategies produce either a
//! full URL, used verbatim on the next call, or a bare token (cursor value,
//! offset) that the adapter places in a request body.

use crate::error::Result;
use crate::jsonquery::JsonQuery;
use crate::types::{scalar_to_string, JsonValue, Record};
use reqwest::header::HeaderMap;
use url::Url;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Absolute URL of the next page
    Url(String),
    /// Provider token the adapter knows how to send
    Token(String),
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The opaque token handed to callers; empty means done
    pub fn into_token(self) -> String {
        match self {
            NextPage::Url(s) | NextPage::Token(s) if !s.is_empty() => s,
            _ => String::new(),
        }
    }
}

/// Everything a strategy may look at after a page was fetched
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// URL the page was fetched from
    pub request_url: &'a str,
    /// Token the page was requested with, empty on the first page
    pub current_token: &'a str,
    pub body: Option<&'a JsonValue>,
    pub headers: &'a HeaderMap,
    pub records: &'a [Record],
}

impl<'a> PageContext<'a> {
    /// Query view over the body, if there is one
    pub fn query(&self) -> Option<JsonQuery<'a>> {
        self.body.map(JsonQuery::new)
    }

    /// Scalar at a dotted path in the body, rendered as a string
    pub fn string_at(&self, path: &str) -> Option<String> {
        self.query()?.at(path).and_then(scalar_to_string)
    }

    /// Query parameter of the request URL
    pub fn request_param(&self, key: &str) -> Option<String> {
        let url = Url::parse(self.request_url).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Stop conditions evaluated before a strategy computes the next page
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StopCondition {
    /// Stop when page is empty (no records)
    #[default]
    EmptyPage,

    /// Stop when a body field has a specific value (e.g. `has_more: false`)
    Field {
        /// Dotted path to the field
        path: String,
        /// Value that ends pagination
        value: JsonValue,
    },

    /// Stop when the records seen so far reach a total reported in the body
    TotalCount {
        /// Dotted path to the total count field
        path: String,
    },
}

impl StopCondition {
    /// Create a field-based stop condition
    pub fn field(path: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::Field {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a total count stop condition
    pub fn total_count(path: impl Into<String>) -> Self {
        Self::TotalCount { path: path.into() }
    }

    /// Whether pagination should stop
    ///
    /// `seen` is the number of records fetched including this page. An
    /// empty page always stops, whatever the condition.
    pub fn should_stop(&self, ctx: &PageContext<'_>, seen: u64) -> bool {
        if ctx.records.is_empty() {
            return true;
        }
        match self {
            StopCondition::EmptyPage => false,
            StopCondition::Field { path, value } => ctx
                .query()
                .and_then(|q| q.at(path))
                .is_some_and(|found| found == value),
            StopCondition::TotalCount { path } => ctx
                .string_at(path)
                .and_then(|s| s.parse::<u64>().ok())
                .is_some_and(|total| seen >= total),
        }
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync + std::fmt::Debug {
    /// Compute the next page from a fetched page
    fn next_page(&self, ctx: &PageContext<'_>) -> Result<NextPage>;
}
