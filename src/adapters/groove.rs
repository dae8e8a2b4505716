//! Groove adapter
//!
//! No static schema: metadata is inferred from one page of each object,
//! fetched in parallel.

use crate::components::{ComponentsConnector, MetadataSource, ReadSpec};
use crate::connector::ConnectorBase;
use crate::error::Result;
use crate::pagination::NextUrlPaginator;
use crate::schema::{EndpointRegistry, EndpointSupport, FieldsV1, Support};

const PAGE_SIZE: u32 = 50;

pub fn new(base: ConnectorBase) -> Result<ComponentsConnector<FieldsV1>> {
    let endpoints = EndpointRegistry::root(vec![EndpointSupport::new(
        "{agents,customers,folders,groups,mailboxes,messages,tickets,widgets}",
        Support::READ,
    )])?;

    Ok(ComponentsConnector::new(base, endpoints)
        .path("mailboxes", "email/mailboxes")
        .with_read(
            ReadSpec::new(NextUrlPaginator::new("meta.pagination.next_page"))
                .page_size("per_page", PAGE_SIZE),
        )
        .metadata(MetadataSource::Sampling))
}
