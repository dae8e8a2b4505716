//! Webhook delivery payloads

use crate::codec::RawJson;
use crate::error::{Error, Result};
use crate::subscribe::{EventType, SubscriptionEvent, SubscriptionUpdateEvent};
use serde::{Deserialize, Serialize};

/// Composite id carried by record events
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventId {
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub object_id: String,
    #[serde(default)]
    pub record_id: String,
    /// Set on `record.updated` for the attribute that changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventBody {
    pub event_type: String,
    #[serde(default)]
    pub id: EventId,
}

/// One event of a delivery; unknown fields such as `actor` are kept raw
pub type AttioEvent = RawJson<EventBody>;

#[derive(Deserialize)]
struct Delivery {
    #[serde(default)]
    events: Vec<AttioEvent>,
}

/// Decode a webhook body into its events
pub fn parse_delivery(body: &[u8]) -> Result<Vec<AttioEvent>> {
    let delivery: Delivery =
        serde_json::from_slice(body).map_err(|e| Error::unmarshal(e.to_string()))?;
    Ok(delivery.events)
}

fn required(value: &str, name: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::missing_expected(format!("event has no {name}")));
    }
    Ok(value.to_string())
}

impl SubscriptionEvent for AttioEvent {
    fn event_type(&self) -> Result<EventType> {
        Ok(match self.event_type.as_str() {
            "record.created" => EventType::Create,
            "record.updated" => EventType::Update,
            "record.deleted" => EventType::Delete,
            _ => EventType::Other,
        })
    }

    fn raw_event_name(&self) -> Result<String> {
        required(&self.event_type, "event_type")
    }

    /// Deliveries identify objects by id, not slug
    fn object_name(&self) -> Result<String> {
        required(&self.id.object_id, "object id")
    }

    fn workspace(&self) -> Result<String> {
        required(&self.id.workspace_id, "workspace id")
    }

    fn record_id(&self) -> Result<String> {
        required(&self.id.record_id, "record id")
    }

    fn event_timestamp_nanos(&self) -> Result<i64> {
        Err(Error::missing_expected("Attio events carry no timestamp"))
    }
}

impl SubscriptionUpdateEvent for AttioEvent {
    fn updated_fields(&self) -> Result<Vec<String>> {
        Ok(self.id.attribute_id.iter().cloned().collect())
    }
}
