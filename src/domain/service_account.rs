//! Service Accounts and Subscriptions
//!
//! Tenant credentials registered on Algoan, and the webhook subscriptions
//! whose secret authenticates inbound events.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{ClientConfig, EventName};

type HmacSha256 = Hmac<Sha256>;

/// Webhook subscription owned by a service account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub event_name: EventName,
    pub target: String,
    #[serde(default, skip_serializing)]
    pub secret: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl Subscription {
    /// Check an `X-Hub-Signature` value against the event payload.
    ///
    /// The signature is the hex HMAC-SHA256 of the compact JSON payload,
    /// optionally prefixed with `sha256=`.
    /// A subscription without a secret rejects every signature.
    pub fn validate_signature(&self, signature: &str, payload: &serde_json::Value) -> bool {
        if self.secret.is_empty() {
            return false;
        }

        let sig = signature.trim();
        let sig_hex = sig.strip_prefix("sha256=").unwrap_or(sig);
        let Ok(provided) = hex::decode(sig_hex) else {
            return false;
        };

        let Some(mac) = self.mac_over(payload) else {
            return false;
        };
        mac.verify_slice(&provided).is_ok()
    }

    /// Compute the signature Algoan attaches to `payload`
    pub fn sign(&self, payload: &serde_json::Value) -> Option<String> {
        let mac = self.mac_over(payload)?;
        Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
    }

    fn mac_over(&self, payload: &serde_json::Value) -> Option<HmacSha256> {
        // Re-serialized, not the received bytes: payloads carry strings only,
        // for which this matches the sender's compact JSON.
        let body = serde_json::to_vec(payload).ok()?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(&body);
        Some(mac)
    }
}

/// Connector tenant on Algoan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub id: String,
    /// Algoan OAuth client credentials of this service account
    pub client_id: String,
    #[serde(default, skip_serializing)]
    pub client_secret: String,
    /// Bridge credentials configured for this tenant
    pub config: ClientConfig,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl ServiceAccount {
    pub fn subscription(&self, subscription_id: &str) -> Option<&Subscription> {
        self.subscriptions.iter().find(|sub| sub.id == subscription_id)
    }
}
