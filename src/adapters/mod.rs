//! Provider adapters
//!
//! Most adapters are a configuration of the components connector. HubSpot
//! and Salesforce wrap one and add batch, metadata and query features;
//! Attio and BigQuery implement their capabilities directly.

pub mod attio;
pub mod bigquery;
pub mod freshdesk;
pub mod front;
pub mod groove;
pub mod hubspot;
pub mod klaviyo;
pub mod salesforce;
pub mod stripe;

pub use attio::AttioConnector;
pub use bigquery::BigQueryConnector;
pub use hubspot::HubspotConnector;
pub use salesforce::SalesforceConnector;

use crate::config::ConnectorConfig;
use crate::connector::{Connector, ConnectorBase};
use crate::error::{Error, Result};
use tracing::info;

/// Providers with an adapter
pub const ADAPTERS: [&str; 9] = [
    "attio",
    "bigquery",
    "freshdesk",
    "front",
    "groove",
    "hubspot",
    "klaviyo",
    "salesforce",
    "stripe",
];

/// The adapter for the base's provider
pub fn connector_for(base: ConnectorBase) -> Result<Box<dyn Connector>> {
    let provider: &'static str = base.provider().name.as_str();
    let connector: Box<dyn Connector> = match provider {
        "attio" => Box::new(AttioConnector::new(base)?),
        "bigquery" => Box::new(BigQueryConnector::new(base)?),
        "freshdesk" => Box::new(freshdesk::new(base)?),
        "front" => Box::new(front::new(base)?),
        "groove" => Box::new(groove::new(base)?),
        "hubspot" => Box::new(HubspotConnector::new(base)?),
        "klaviyo" => Box::new(klaviyo::new(base)?),
        "salesforce" => Box::new(SalesforceConnector::new(base)?),
        "stripe" => Box::new(stripe::new(base)?),
        other => {
            return Err(Error::UnknownProvider {
                provider: other.to_string(),
            })
        }
    };
    Ok(connector)
}

/// Build a connector from configuration
pub fn new_connector(config: &ConnectorConfig) -> Result<Box<dyn Connector>> {
    let base = ConnectorBase::new(config.connector_params()?)?;
    let connector = connector_for(base)?;
    info!(
        provider = connector.provider(),
        module = %connector.module(),
        capabilities = ?connector.capabilities(),
        "Connector created"
    );
    Ok(connector)
}
