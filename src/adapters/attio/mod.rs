//! Attio adapter
//!
//! Records are listed with POST queries paged by offset, identified by the
//! composite `id.record_id`, and carry their attribute values under
//! `values`. Webhooks are filtered by object id, resolved once per object
//! and cached for the connector's lifetime.

mod attributes;
mod connector;
mod events;
mod records;
mod webhooks;

pub use attributes::attribute_metadata;
pub use connector::AttioConnector;
pub use events::{parse_delivery, AttioEvent, EventBody, EventId};

#[cfg(test)]
mod tests;
