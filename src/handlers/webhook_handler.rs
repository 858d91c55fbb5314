//! Webhook Dispatcher
//!
//! Authenticates an inbound Algoan event against the subscription it claims
//! to come from, then routes it by event name.

use std::sync::Arc;

use tracing::debug;

use super::{BankReaderHandler, LinkRequiredHandler};
use crate::clients::{Aggregator, CanonicalClient};
use crate::domain::{
    BankreaderLinkRequiredPayload, BankreaderRequiredPayload, DomainError, EventDto, EventName,
};
use crate::error::AppResult;
use crate::registry::ServiceAccountRegistry;

/// Entry point for every webhook delivery
pub struct WebhookHandler {
    registry: Arc<dyn ServiceAccountRegistry>,
    link_required: LinkRequiredHandler,
    bank_reader: BankReaderHandler,
}

impl WebhookHandler {
    pub fn new(
        registry: Arc<dyn ServiceAccountRegistry>,
        canonical: Arc<dyn CanonicalClient>,
        aggregator: Arc<dyn Aggregator>,
    ) -> Self {
        Self {
            registry,
            link_required: LinkRequiredHandler::new(canonical.clone(), aggregator.clone()),
            bank_reader: BankReaderHandler::new(canonical, aggregator),
        }
    }

    /// Validate and dispatch `event`.
    ///
    /// Fails with an unauthorized error when no service account owns the
    /// subscription, or when `signature` does not match the payload. The
    /// registry is consulted before any signature check.
    pub async fn handle(&self, event: &EventDto, signature: &str) -> AppResult<()> {
        let subscription_id = event.subscription.id.as_str();

        let service_account = self
            .registry
            .find_by_subscription_id(subscription_id)
            .ok_or_else(|| DomainError::UnknownSubscription(subscription_id.to_string()))?;
        debug!(
            subscription_id = %subscription_id,
            service_account_id = %service_account.id,
            "Found a service account for subscription"
        );

        let subscription = service_account
            .subscription(subscription_id)
            .ok_or_else(|| DomainError::UnknownSubscription(subscription_id.to_string()))?;

        if !subscription.validate_signature(signature, &event.payload) {
            return Err(DomainError::InvalidSignature.into());
        }

        match event.subscription.event_name {
            EventName::BankreaderLinkRequired => {
                let payload: BankreaderLinkRequiredPayload = event.payload_as()?;
                self.link_required.execute(service_account, &payload).await
            }
            EventName::BankreaderRequired => {
                let payload: BankreaderRequiredPayload = event.payload_as()?;
                self.bank_reader.execute(service_account, &payload).await
            }
            // Subscriptions only exist for the handled events
            other => {
                debug!(event_name = other.as_str(), "Ignoring event");
                Ok(())
            }
        }
    }
}
