//! Pagination module
//!
//! Supports: Cursor, Offset, Page Number, Last Id, Link Header, Next URL
//!
//! # Overview
//!
//! Every strategy turns a fetched page into an opaque next-page token.
//! An empty token means the read is done; a page without records always
//! ends pagination, whatever the provider claims about further pages.

mod strategies;
mod types;

pub use strategies::{
    parse_link_header, CursorPaginator, LastIdPaginator, LinkHeaderPaginator, NextUrlPaginator,
    NoPaginator, OffsetPaginator, PageNumberPaginator,
};
pub use types::{NextPage, PageContext, Paginator, StopCondition};

#[cfg(test)]
mod tests;
