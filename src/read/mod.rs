//! Read pipeline
//!
//! Pieces every read is composed of: build the page URL, extract records
//! from the body, compute the next-page token, then marshal rows that keep
//! the raw record next to the lowercased projection of requested fields,
//! with associated records joined on by id.

mod associations;
mod extract;
mod page;
mod rows;
mod time;

pub use associations::{join_associations, EmbeddedAssociations, RowAssociations};
pub use extract::{ExtractFn, RecordsExtractor};
pub use page::{is_url_token, page_url, PageParser};
pub use rows::{project, RowMarshaller};
pub use time::{TimeFilter, TimeFormat};
