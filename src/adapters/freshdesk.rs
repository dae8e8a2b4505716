//! Freshdesk adapter
//!
//! Tenant subdomain in the base URL, Basic auth with the API key as user
//! name, root-array list responses paged through the `Link` header.

use crate::components::{ComponentsConnector, MetadataSource, ReadSpec, WriteSpec};
use crate::connector::ConnectorBase;
use crate::error::Result;
use crate::pagination::LinkHeaderPaginator;
use crate::read::{RecordsExtractor, TimeFilter, TimeFormat};
use crate::schema::{EndpointRegistry, EndpointSupport, FieldsV1, Support};
use crate::types::Method;

const PAGE_SIZE: u32 = 100;

pub fn new(base: ConnectorBase) -> Result<ComponentsConnector<FieldsV1>> {
    let endpoints = EndpointRegistry::root(vec![
        EndpointSupport::new(
            "{companies,contacts,tickets}",
            Support::READ.union(Support::WRITE).union(Support::DELETE),
        ),
        EndpointSupport::new("{agents,groups,products,roles}", Support::READ),
    ])?;

    Ok(ComponentsConnector::new(base, endpoints)
        .with_read(
            ReadSpec::new(LinkHeaderPaginator::default())
                .records(RecordsExtractor::Root)
                .page_size("per_page", PAGE_SIZE)
                .time_filter(TimeFilter::new("updated_since", TimeFormat::Rfc3339)),
        )
        .with_write(WriteSpec::new().update_method(Method::PUT))
        .with_delete()
        .metadata(MetadataSource::Sampling))
}
