//! Front adapter
//!
//! Static schema, `_results` envelopes and `_pagination.next` URLs.

use crate::components::{ComponentsConnector, ReadSpec, WriteSpec};
use crate::connector::ConnectorBase;
use crate::error::Result;
use crate::pagination::NextUrlPaginator;
use crate::read::{TimeFilter, TimeFormat};
use crate::schema::{
    embedded, parse_embedded, EmbeddedSchemas, EndpointRegistry, EndpointSupport, FieldsV1,
    Support,
};
use std::sync::LazyLock;

static SCHEMAS: EmbeddedSchemas<FieldsV1> = LazyLock::new(|| {
    parse_embedded("front", include_str!("../../providers/front/schemas.json"))
});

const PAGE_SIZE: u32 = 100;

fn endpoints() -> Result<EndpointRegistry> {
    let editable = Support::READ.union(Support::WRITE);
    EndpointRegistry::root(vec![
        EndpointSupport::new("{accounts,contacts,tags}", editable.union(Support::DELETE)),
        EndpointSupport::new("{conversations,teammates}", editable),
        EndpointSupport::new("inboxes", Support::READ),
    ])
}

pub fn new(base: ConnectorBase) -> Result<ComponentsConnector<FieldsV1>> {
    Ok(ComponentsConnector::new(base, endpoints()?)
        .schemas(embedded(&SCHEMAS)?)
        .with_read(
            ReadSpec::new(NextUrlPaginator::new("_pagination.next"))
                .page_size("limit", PAGE_SIZE)
                .time_filter(TimeFilter::new("q[updated_after]", TimeFormat::UnixSeconds)),
        )
        .with_write(WriteSpec::new())
        .with_delete())
}
