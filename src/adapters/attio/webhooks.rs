//! Webhook subscriptions and signature verification

use super::connector::AttioConnector;
use crate::connector::{Subscriber, WebhookVerifier};
use crate::error::{Error, Result};
use crate::subscribe::{
    Registration, SubscribeParams, SubscriptionResult, SubscriptionStatus, VerificationParams,
    WebhookRequest,
};
use crate::types::{JsonValue, Operation};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

impl AttioConnector {
    async fn register(
        &self,
        webhook_url: &str,
        object: &str,
        events: Vec<String>,
    ) -> Result<(Registration, JsonValue)> {
        let object_id = self.object_id(object).await?;
        let subscriptions: Vec<JsonValue> = events
            .iter()
            .map(|event| {
                json!({
                    "event_type": event,
                    "filter": {
                        "$and": [{"field": "id.object_id", "operator": "equals", "value": object_id}]
                    }
                })
            })
            .collect();
        let body = json!({
            "data": {
                "target_url": webhook_url,
                "subscriptions": subscriptions,
            }
        });

        let url = self.base.url(&["webhooks"])?.to_string();
        let response = self.base.json().post(&url, &body).await?;
        let id = response.query()?.str_required("data.id.webhook_id")?.to_string();
        info!(object, webhook_id = %id, "Attio webhook registered");

        let registration = Registration {
            id,
            object_name: object.to_string(),
            provider_events: events,
        };
        Ok((registration, response.body()?.cloned().unwrap_or_default()))
    }

    async fn delete_webhook(&self, id: &str) -> Result<()> {
        let url = self.base.url(&["webhooks", id])?.to_string();
        self.base.json().delete(&url).await?;
        info!(webhook_id = id, "Attio webhook deleted");
        Ok(())
    }

    /// Delete webhooks, returning the ones still registered afterwards
    async fn remove_webhooks(&self, registrations: &[Registration]) -> Result<Vec<Registration>> {
        let jobs: Vec<BoxFuture<'_, Result<Option<Registration>>>> = registrations
            .iter()
            .map(|registration| {
                async move {
                    match self.delete_webhook(&registration.id).await {
                        Ok(()) => Ok(None),
                        Err(e) => {
                            warn!(
                                webhook_id = %registration.id,
                                error = %e,
                                "Attio webhook not deleted"
                            );
                            Ok(Some(registration.clone()))
                        }
                    }
                }
                .boxed()
            })
            .collect();
        Ok(self.runner.run(jobs).await?.into_iter().flatten().collect())
    }
}

#[async_trait]
impl Subscriber for AttioConnector {
    async fn subscribe(&self, params: &SubscribeParams) -> Result<SubscriptionResult> {
        if params.request.webhook_url.is_empty() {
            return Err(Error::missing_param("webhookUrl"));
        }
        for object in params.subscription_events.keys() {
            self.check(object, Operation::Subscribe)?;
        }

        let mut by_object: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for planned in self.events.plan(params)? {
            let events = by_object.entry(planned.object_name).or_default();
            if !events.contains(&planned.provider_event) {
                events.push(planned.provider_event);
            }
        }

        let url = params.request.webhook_url.as_str();
        let jobs: Vec<BoxFuture<'_, Result<Result<(Registration, JsonValue)>>>> = by_object
            .into_iter()
            .map(|(object, events)| {
                async move { Ok(self.register(url, &object, events).await) }.boxed()
            })
            .collect();

        let mut registrations = Vec::new();
        let mut responses = Vec::new();
        let mut errors = Vec::new();
        for outcome in self.runner.run(jobs).await? {
            match outcome {
                Ok((registration, response)) => {
                    registrations.push(registration);
                    responses.push(response);
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            return Ok(SubscriptionResult {
                status: SubscriptionStatus::Success,
                registrations,
                result: JsonValue::Array(responses),
                subscription_events: params.subscription_events.clone(),
            });
        }

        // A partial subscription is undone; whatever cannot be removed is
        // handed back so the caller can retry `delete_subscription`.
        warn!(
            registered = registrations.len(),
            failed = errors.len(),
            "Attio subscription failed, removing registered webhooks"
        );
        let removed = self.remove_webhooks(&registrations).await;
        let leftover = removed.unwrap_or(registrations);
        if leftover.is_empty() {
            return Err(Error::join(errors));
        }
        Ok(SubscriptionResult {
            status: SubscriptionStatus::Failed,
            registrations: leftover,
            result: JsonValue::Array(responses),
            subscription_events: params.subscription_events.clone(),
        })
    }

    async fn delete_subscription(&self, result: &SubscriptionResult) -> Result<()> {
        let ids: BTreeSet<&str> = result
            .registrations
            .iter()
            .map(|r| r.id.as_str())
            .collect();

        let jobs: Vec<BoxFuture<'_, Result<()>>> = ids
            .into_iter()
            .map(|id| self.delete_webhook(id).boxed())
            .collect();
        self.runner.run(jobs).await?;
        Ok(())
    }
}

impl WebhookVerifier for AttioConnector {
    fn verify_webhook_message(
        &self,
        request: &WebhookRequest,
        params: &VerificationParams,
    ) -> Result<bool> {
        self.verifier.verify(request, params)
    }
}
