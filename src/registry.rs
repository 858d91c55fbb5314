//! Service Account Registry
//!
//! Read-only lookup of service accounts by subscription id. The registry is
//! loaded from Algoan once at startup and shared across requests.

use tracing::info;

use crate::clients::{ClientError, ServiceAccountSource};
use crate::domain::{EventName, ServiceAccount, Subscription};

/// Lookup used by the webhook dispatcher
pub trait ServiceAccountRegistry: Send + Sync {
    fn find_by_subscription_id(&self, subscription_id: &str) -> Option<&ServiceAccount>;
}

/// Registry backed by a frozen list of service accounts
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    service_accounts: Vec<ServiceAccount>,
}

impl InMemoryRegistry {
    pub fn new(service_accounts: Vec<ServiceAccount>) -> Self {
        Self { service_accounts }
    }

    pub fn service_accounts(&self) -> &[ServiceAccount] {
        &self.service_accounts
    }

    /// Load service accounts and their subscriptions from Algoan.
    ///
    /// Algoan does not return subscription secrets, so every loaded
    /// subscription without one is given `hooks_secret`. When `target` is
    /// set, every handled event without a subscription pointing at `target`
    /// gets one, registered with the same secret.
    pub async fn bootstrap(
        source: &dyn ServiceAccountSource,
        target: Option<&str>,
        hooks_secret: &str,
    ) -> Result<Self, ClientError> {
        let mut service_accounts = source.list_service_accounts().await?;

        for service_account in &mut service_accounts {
            let mut subscriptions = source.list_subscriptions(service_account).await?;

            if let Some(target) = target {
                for event_name in missing_events(&subscriptions, target) {
                    let created = source
                        .create_subscription(service_account, target, event_name, hooks_secret)
                        .await?;
                    info!(
                        service_account_id = %service_account.id,
                        subscription_id = %created.id,
                        event_name = event_name.as_str(),
                        "Created subscription"
                    );
                    subscriptions.push(created);
                }
            }

            for subscription in subscriptions.iter_mut().filter(|sub| sub.secret.is_empty()) {
                subscription.secret = hooks_secret.to_string();
            }
            service_account.subscriptions = subscriptions;
        }

        info!(
            service_accounts = service_accounts.len(),
            "Service account registry loaded"
        );

        Ok(Self::new(service_accounts))
    }
}

impl ServiceAccountRegistry for InMemoryRegistry {
    fn find_by_subscription_id(&self, subscription_id: &str) -> Option<&ServiceAccount> {
        self.service_accounts
            .iter()
            .find(|sa| sa.subscription(subscription_id).is_some())
    }
}

/// Handled events that have no subscription for `target`
fn missing_events(subscriptions: &[Subscription], target: &str) -> Vec<EventName> {
    EventName::HANDLED
        .into_iter()
        .filter(|event_name| {
            !subscriptions
                .iter()
                .any(|sub| sub.event_name == *event_name && sub.target == target)
        })
        .collect()
}
