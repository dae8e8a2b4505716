//! Mapping between normalized events and provider event names

use super::types::{EventType, SubscribeParams};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// A provider event a subscription must register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEvent {
    pub object_name: String,
    pub event: EventType,
    pub provider_event: String,
}

/// Per-object table of supported events
#[derive(Debug, Clone, Default)]
pub struct EventMapping {
    objects: BTreeMap<String, BTreeMap<EventType, Vec<String>>>,
}

impl EventMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the provider events behind one normalized event of an object
    #[must_use]
    pub fn event(mut self, object: &str, event: EventType, provider_events: &[&str]) -> Self {
        self.objects
            .entry(object.to_string())
            .or_default()
            .insert(event, provider_events.iter().map(|e| (*e).to_string()).collect());
        self
    }

    /// Provider events for an (object, event) pair
    pub fn provider_events(&self, object: &str, event: EventType) -> Result<&[String]> {
        self.objects
            .get(object)
            .and_then(|events| events.get(&event))
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnsupportedSubscriptionEvent {
                object: object.to_string(),
                event: event.to_string(),
            })
    }

    /// Validate every requested pair and list the provider events to register
    ///
    /// Nothing is returned unless every pair is supported.
    pub fn plan(&self, params: &SubscribeParams) -> Result<Vec<PlannedEvent>> {
        if params.subscription_events.is_empty() {
            return Err(Error::MissingObjects);
        }

        let mut planned = Vec::new();
        for (object, wanted) in &params.subscription_events {
            for event in &wanted.events {
                for provider_event in self.provider_events(object, *event)? {
                    planned.push(PlannedEvent {
                        object_name: object.clone(),
                        event: *event,
                        provider_event: provider_event.clone(),
                    });
                }
            }
        }
        Ok(planned)
    }

    /// Normalized event of a raw provider event name
    pub fn event_type(&self, provider_event: &str) -> EventType {
        self.objects
            .values()
            .flat_map(|events| events.iter())
            .find(|(_, names)| names.iter().any(|n| n == provider_event))
            .map_or(EventType::Other, |(event, _)| *event)
    }

    /// Objects with at least one mapped event
    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }
}
