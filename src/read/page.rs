//! Page request and result assembly

use super::extract::RecordsExtractor;
use super::rows::RowMarshaller;
use crate::connector::ReadResult;
use crate::error::{Error, Result};
use crate::http::JsonHttpResponse;
use crate::pagination::{NextPage, PageContext, Paginator};
use crate::urlbuilder::UrlBuilder;
use std::collections::BTreeSet;
use tracing::debug;

/// Whether a next-page token is a full URL to request verbatim
pub fn is_url_token(token: &str) -> bool {
    token.starts_with("https://") || token.starts_with("http://")
}

/// URL of the page a token points at
///
/// The first page uses `first`. A URL token replaces it entirely; a bare
/// token is sent in `token_param`.
pub fn page_url(first: UrlBuilder, next_page: &str, token_param: Option<&str>) -> Result<UrlBuilder> {
    if next_page.is_empty() {
        return Ok(first);
    }
    if is_url_token(next_page) {
        return UrlBuilder::parse(next_page);
    }
    match token_param {
        Some(param) => {
            let mut url = first;
            url.with_query(param, next_page);
            Ok(url)
        }
        None => Err(Error::invalid_param(
            "nextPage",
            "expected the URL returned by a previous read",
        )),
    }
}

/// Everything needed to turn a fetched page into a [`ReadResult`]
#[derive(Debug, Clone, Copy)]
pub struct PageParser<'a> {
    pub extractor: &'a RecordsExtractor,
    pub paginator: &'a dyn Paginator,
    pub marshaller: &'a RowMarshaller,
    pub fields: &'a BTreeSet<String>,
}

impl PageParser<'_> {
    /// Extract records, compute the next page and marshal rows
    ///
    /// A page without records ends the read even when the provider still
    /// hands out a cursor.
    pub fn parse(
        &self,
        response: &JsonHttpResponse,
        request_url: &str,
        current_token: &str,
    ) -> Result<ReadResult> {
        let body = response.body()?;
        let records = self.extractor.extract(body)?;

        let next = if records.is_empty() {
            NextPage::Done
        } else {
            let ctx = PageContext {
                request_url,
                current_token,
                body,
                headers: &response.headers,
                records: &records,
            };
            self.paginator.next_page(&ctx)?
        };

        let next_page = next.into_token();
        debug!(
            url = request_url,
            records = records.len(),
            done = next_page.is_empty(),
            "Parsed page"
        );

        Ok(ReadResult::new(
            self.marshaller.marshal(records, self.fields),
            next_page,
        ))
    }
}
