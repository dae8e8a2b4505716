//! Subscription module
//!
//! Event taxonomy mapping, subscription request/result shapes, and webhook
//! signature verification. Adapters supply the provider event table and
//! the subscription endpoints.

mod events;
mod types;
mod verify;

pub use events::{EventMapping, PlannedEvent};
pub use types::{
    EventType, ObjectEvents, Registration, SubscribeParams, SubscriptionEvent,
    SubscriptionRequest, SubscriptionResult, SubscriptionStatus, SubscriptionUpdateEvent,
    VerificationParams, WebhookRequest,
};
pub use verify::{sign_hex, verify_hmac_sha256, HmacVerifier, SignatureEncoding};

#[cfg(test)]
mod tests;
