//! Salesforce adapter
//!
//! Reads run SOQL through the `query` resource and follow
//! `nextRecordsUrl`. Single writes and deletes go to `sobjects/{object}`
//! (updates answer 204 with no body). Batches use the composite sObject
//! collection resource, whose records carry an `attributes.type`
//! discriminator. Metadata comes from the describe resource.

mod composite;
mod connector;
mod describe;
mod soql;

pub use composite::{SObjectAttributes, SObjectType};
pub use connector::SalesforceConnector;
pub use describe::describe_field;
pub use soql::SoqlQuery;
