//! Klaviyo adapter
//!
//! JSON:API everywhere: records carry their fields under `attributes`,
//! writes send `{"data": {"type", "attributes"}}`, and every request names
//! the API revision it was written against.

use crate::components::{ComponentsConnector, ReadSpec, WriteSpec};
use crate::connector::ConnectorBase;
use crate::error::Result;
use crate::pagination::NextUrlPaginator;
use crate::read::RowMarshaller;
use crate::schema::{
    embedded, parse_embedded, EmbeddedSchemas, EndpointRegistry, EndpointSupport, FieldsV1,
    Support,
};
use crate::write::BodyEncoding;
use std::sync::LazyLock;

static SCHEMAS: EmbeddedSchemas<FieldsV1> = LazyLock::new(|| {
    parse_embedded("klaviyo", include_str!("../../providers/klaviyo/schemas.json"))
});

pub const CONTENT_TYPE: &str = "application/vnd.api+json";

pub fn new(base: ConnectorBase) -> Result<ComponentsConnector<FieldsV1>> {
    let endpoints = EndpointRegistry::root(vec![
        EndpointSupport::new("{profiles,campaigns}", Support::READ.union(Support::WRITE)),
        EndpointSupport::new(
            "{lists,segments,tags}",
            Support::READ.union(Support::WRITE).union(Support::DELETE),
        ),
        EndpointSupport::new("metrics", Support::READ),
    ])?;
    let revision = base.module().version.clone();

    Ok(ComponentsConnector::new(base, endpoints)
        .schemas(embedded(&SCHEMAS)?)
        .header("revision", revision)
        .header("accept", CONTENT_TYPE)
        .content_type(CONTENT_TYPE)
        .with_read(
            ReadSpec::new(NextUrlPaginator::new("links.next"))
                .marshaller(RowMarshaller::new().with_nested_key("attributes")),
        )
        .with_write(
            WriteSpec::new()
                .encoding(BodyEncoding::JsonApi { type_name: None })
                .record_path("data"),
        )
        .with_delete())
}
