//! HubSpot adapter
//!
//! CRM objects live under `objects/{object}` and keep their fields in a
//! `properties` envelope. Besides the components read/write/delete paths
//! this adapter provides:
//!
//! - live V2 metadata from the properties API
//! - batch create/update with per-record attribution
//! - property upserts (create, or update on conflict)
//! - batch read by ids, with associations from the v4 API
//! - entity name normalization (`Contact` -> `contacts`)

mod associations;
mod batch;
mod connector;
mod properties;

pub use connector::HubspotConnector;
pub use properties::{property_definition, property_metadata};
