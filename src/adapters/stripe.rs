//! Stripe adapter
//!
//! Lists page with `starting_after` set to the last id until `has_more` is
//! false. Writes are form encoded and updates are POSTs to the record URL.

use crate::components::{ComponentsConnector, ReadSpec, WriteSpec};
use crate::connector::ConnectorBase;
use crate::error::Result;
use crate::pagination::{LastIdPaginator, StopCondition};
use crate::read::{TimeFilter, TimeFormat};
use crate::schema::{
    embedded, parse_embedded, EmbeddedSchemas, EndpointRegistry, EndpointSupport, FieldsV1,
    Support,
};
use crate::types::Method;
use crate::write::BodyEncoding;
use std::sync::LazyLock;

static SCHEMAS: EmbeddedSchemas<FieldsV1> = LazyLock::new(|| {
    parse_embedded("stripe", include_str!("../../providers/stripe/schemas.json"))
});

const PAGE_SIZE: u32 = 100;

pub fn new(base: ConnectorBase) -> Result<ComponentsConnector<FieldsV1>> {
    let endpoints = EndpointRegistry::root(vec![
        EndpointSupport::new(
            "{customers,products,subscriptions}",
            Support::READ.union(Support::WRITE).union(Support::DELETE),
        ),
        EndpointSupport::new("{invoices,prices}", Support::READ.union(Support::WRITE)),
        EndpointSupport::new("charges", Support::READ),
    ])?;

    Ok(ComponentsConnector::new(base, endpoints)
        .schemas(embedded(&SCHEMAS)?)
        .with_read(
            ReadSpec::new(
                LastIdPaginator::new("id", "starting_after")
                    .with_stop_condition(StopCondition::field("has_more", false)),
            )
            .page_size("limit", PAGE_SIZE)
            .time_filter(
                TimeFilter::new("created[gte]", TimeFormat::UnixSeconds).with_until("created[lt]"),
            ),
        )
        .with_write(
            WriteSpec::new()
                .update_method(Method::POST)
                .encoding(BodyEncoding::Form),
        )
        .with_delete())
}
