//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{NextPage, PageContext, Paginator, StopCondition};
use crate::error::Result;
use crate::types::scalar_to_string;
use crate::urlbuilder::UrlBuilder;
use tracing::debug;
use url::Url;

/// Replace one query parameter on the URL the page came from
fn with_param(ctx: &PageContext<'_>, param: &str, value: impl Into<String>) -> Result<NextPage> {
    let mut url = UrlBuilder::parse(ctx.request_url)?;
    url.with_query(param, value);
    Ok(NextPage::Url(url.to_string()))
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination (e.g., HubSpot `paging.next.after`)
///
/// With a query parameter the token is the next URL; without one the bare
/// cursor is returned for the adapter to send.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Dotted path of the cursor in the response
    pub cursor_path: String,
    /// Query parameter carrying the cursor
    pub cursor_param: Option<String>,
    pub stop_condition: StopCondition,
}

impl CursorPaginator {
    pub fn new(cursor_path: impl Into<String>) -> Self {
        Self {
            cursor_path: cursor_path.into(),
            cursor_param: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    /// Send the cursor as a query parameter
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.cursor_param = Some(param.into());
        self
    }

    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }
}

impl Paginator for CursorPaginator {
    fn next_page(&self, ctx: &PageContext<'_>) -> Result<NextPage> {
        if self.stop_condition.should_stop(ctx, ctx.records.len() as u64) {
            return Ok(NextPage::Done);
        }

        let Some(cursor) = ctx.string_at(&self.cursor_path).filter(|c| !c.is_empty()) else {
            return Ok(NextPage::Done);
        };

        match &self.cursor_param {
            Some(param) => with_param(ctx, param, cursor),
            None => Ok(NextPage::Token(cursor)),
        }
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// The next offset is the current one plus the records on this page. With a
/// total-count stop condition the read ends once the total is reached; without
/// one, a short page ends it. An empty page always ends it, so a stale total
/// cannot loop forever.
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Query parameter carrying the offset; `None` returns bare offsets
    pub offset_param: Option<String>,
    /// Number of records requested per page
    pub page_size: u32,
    pub stop_condition: StopCondition,
}

impl OffsetPaginator {
    pub fn new(page_size: u32) -> Self {
        Self {
            offset_param: None,
            page_size,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.offset_param = Some(param.into());
        self
    }

    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }

    fn current_offset(&self, ctx: &PageContext<'_>) -> u64 {
        let raw = match &self.offset_param {
            Some(param) => ctx.request_param(param),
            None => Some(ctx.current_token.to_string()),
        };
        raw.and_then(|s| s.parse().ok()).unwrap_or(0)
    }
}

impl Paginator for OffsetPaginator {
    fn next_page(&self, ctx: &PageContext<'_>) -> Result<NextPage> {
        let next_offset = self.current_offset(ctx) + ctx.records.len() as u64;

        if self.stop_condition.should_stop(ctx, next_offset) {
            debug!(offset = next_offset, "Offset pagination reached the end");
            return Ok(NextPage::Done);
        }

        let uses_total = matches!(self.stop_condition, StopCondition::TotalCount { .. });
        if !uses_total && ctx.records.len() < self.page_size as usize {
            return Ok(NextPage::Done);
        }

        match &self.offset_param {
            Some(param) => with_param(ctx, param, next_offset.to_string()),
            None => Ok(NextPage::Token(next_offset.to_string())),
        }
    }
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination (e.g., `?page=2&per_page=50`)
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    /// Query parameter name for page number
    pub page_param: String,
    /// First page number (usually 0 or 1)
    pub start_page: u32,
    /// Page size; a shorter page ends pagination
    pub page_size: Option<u32>,
    pub stop_condition: StopCondition,
}

impl PageNumberPaginator {
    pub fn new(page_param: impl Into<String>, start_page: u32) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            page_size: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }
}

impl Paginator for PageNumberPaginator {
    fn next_page(&self, ctx: &PageContext<'_>) -> Result<NextPage> {
        if self.stop_condition.should_stop(ctx, ctx.records.len() as u64) {
            return Ok(NextPage::Done);
        }
        if let Some(size) = self.page_size {
            if ctx.records.len() < size as usize {
                return Ok(NextPage::Done);
            }
        }

        let page = ctx
            .request_param(&self.page_param)
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(self.start_page);
        with_param(ctx, &self.page_param, (page + 1).to_string())
    }
}

// ============================================================================
// Last Id Pagination
// ============================================================================

/// Continue after the id of the last record (e.g., Stripe `starting_after`)
#[derive(Debug, Clone)]
pub struct LastIdPaginator {
    /// Field of the record holding its id
    pub id_field: String,
    /// Query parameter receiving the last id
    pub param: String,
    pub stop_condition: StopCondition,
}

impl LastIdPaginator {
    pub fn new(id_field: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            param: param.into(),
            stop_condition: StopCondition::EmptyPage,
        }
    }

    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }
}

impl Paginator for LastIdPaginator {
    fn next_page(&self, ctx: &PageContext<'_>) -> Result<NextPage> {
        if self.stop_condition.should_stop(ctx, ctx.records.len() as u64) {
            return Ok(NextPage::Done);
        }

        let last_id = ctx
            .records
            .last()
            .and_then(|record| record.get(&self.id_field))
            .and_then(scalar_to_string);
        match last_id {
            Some(id) if !id.is_empty() => with_param(ctx, &self.param, id),
            _ => Ok(NextPage::Done),
        }
    }
}

// ============================================================================
// Link Header Pagination
// ============================================================================

/// Link header pagination (RFC 8288)
///
/// Format: `Link: <https://host/api/v2/contacts?page=2>; rel="next", ...`
#[derive(Debug, Clone)]
pub struct LinkHeaderPaginator {
    /// Rel value to follow (default: "next")
    pub rel: String,
}

impl Default for LinkHeaderPaginator {
    fn default() -> Self {
        Self {
            rel: "next".to_string(),
        }
    }
}

impl LinkHeaderPaginator {
    pub fn new(rel: impl Into<String>) -> Self {
        Self { rel: rel.into() }
    }
}

impl Paginator for LinkHeaderPaginator {
    fn next_page(&self, ctx: &PageContext<'_>) -> Result<NextPage> {
        if ctx.records.is_empty() {
            return Ok(NextPage::Done);
        }
        Ok(ctx
            .header("link")
            .and_then(|header| parse_link_header(header, &self.rel))
            .map_or(NextPage::Done, NextPage::Url))
    }
}

/// Parse a Link header and extract the URL for the given rel
///
/// URLs are delimited by angle brackets, so commas inside them are safe.
/// Multi-valued rels (`rel="next last"`) match on any value.
pub fn parse_link_header(header: &str, target_rel: &str) -> Option<String> {
    let mut rest = header;

    while let Some(start) = rest.find('<') {
        let end = start + rest[start..].find('>')?;
        let url = &rest[start + 1..end];
        let params_end = rest[end..].find('<').map_or(rest.len(), |i| end + i);

        for param in rest[end + 1..params_end].split(';') {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            let value = value
                .trim()
                .trim_end_matches(',')
                .trim()
                .trim_matches('"')
                .trim_matches('\'');
            if value
                .split_whitespace()
                .any(|rel| rel.eq_ignore_ascii_case(target_rel))
            {
                return Some(url.to_string());
            }
        }

        rest = &rest[params_end..];
    }

    None
}

// ============================================================================
// Next URL Pagination
// ============================================================================

/// Next URL in the response body (e.g., `_pagination.next`, `links.next`)
///
/// Relative URLs are resolved against the request URL.
#[derive(Debug, Clone)]
pub struct NextUrlPaginator {
    /// Dotted path of the next URL in the response
    pub path: String,
}

impl NextUrlPaginator {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Paginator for NextUrlPaginator {
    fn next_page(&self, ctx: &PageContext<'_>) -> Result<NextPage> {
        if ctx.records.is_empty() {
            return Ok(NextPage::Done);
        }
        let Some(next) = ctx.string_at(&self.path).filter(|s| !s.is_empty()) else {
            return Ok(NextPage::Done);
        };

        if Url::parse(&next).is_ok() {
            return Ok(NextPage::Url(next));
        }
        let resolved = Url::parse(ctx.request_url)?.join(&next)?;
        Ok(NextPage::Url(resolved.to_string()))
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn next_page(&self, _ctx: &PageContext<'_>) -> Result<NextPage> {
        Ok(NextPage::Done)
    }
}
