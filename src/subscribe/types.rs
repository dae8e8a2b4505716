//! Subscription request, result and webhook types

use crate::error::Result;
use crate::types::JsonValue;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Normalized change event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Create,
    Update,
    Delete,
    Other,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Create => "create",
            EventType::Update => "update",
            EventType::Delete => "delete",
            EventType::Other => "other",
        };
        f.write_str(s)
    }
}

/// Events requested for one object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectEvents {
    pub events: Vec<EventType>,
}

impl ObjectEvents {
    pub fn new(events: impl IntoIterator<Item = EventType>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

/// Where the provider should deliver events
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub webhook_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeParams {
    pub request: SubscriptionRequest,
    /// Object name to the events wanted for it
    pub subscription_events: BTreeMap<String, ObjectEvents>,
}

impl SubscribeParams {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            request: SubscriptionRequest {
                webhook_url: webhook_url.into(),
            },
            subscription_events: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn object(
        mut self,
        object: impl Into<String>,
        events: impl IntoIterator<Item = EventType>,
    ) -> Self {
        self.subscription_events
            .insert(object.into(), ObjectEvents::new(events));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Success,
    Failed,
}

/// One webhook registered at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Provider id of the registration
    pub id: String,
    pub object_name: String,
    pub provider_events: Vec<String>,
}

/// Outcome of a subscribe call, kept by the caller to delete it later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResult {
    pub status: SubscriptionStatus,
    pub registrations: Vec<Registration>,
    /// Provider responses, unmodified
    #[serde(default)]
    pub result: JsonValue,
    pub subscription_events: BTreeMap<String, ObjectEvents>,
}

/// An incoming webhook delivery
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl WebhookRequest {
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }
}

/// Secret shared with the provider when the subscription was created
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct VerificationParams {
    pub secret: String,
}

impl VerificationParams {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for VerificationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationParams")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A decoded webhook payload
pub trait SubscriptionEvent {
    fn event_type(&self) -> Result<EventType>;
    fn raw_event_name(&self) -> Result<String>;
    fn object_name(&self) -> Result<String>;
    fn workspace(&self) -> Result<String>;
    fn record_id(&self) -> Result<String>;
    fn event_timestamp_nanos(&self) -> Result<i64>;
}

/// Events that list which fields changed
pub trait SubscriptionUpdateEvent: SubscriptionEvent {
    fn updated_fields(&self) -> Result<Vec<String>>;
}
