//! Webhook Events
//!
//! Shape of the events Algoan posts to the connector.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Event names a subscription can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    BankreaderLinkRequired,
    BankreaderRequired,
    BankreaderConfigurationRequired,
    #[serde(other)]
    Other,
}

impl EventName {
    /// Events the connector subscribes to and handles
    pub const HANDLED: [EventName; 2] = [
        EventName::BankreaderLinkRequired,
        EventName::BankreaderRequired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::BankreaderLinkRequired => "bankreader_link_required",
            EventName::BankreaderRequired => "bankreader_required",
            EventName::BankreaderConfigurationRequired => "bankreader_configuration_required",
            EventName::Other => "other",
        }
    }
}

/// Subscription section of an inbound event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSubscription {
    pub id: String,
    pub event_name: EventName,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Event posted on the webhook endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDto {
    pub subscription: EventSubscription,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub time: Option<i64>,
}

/// Payload of `bankreader_link_required`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankreaderLinkRequiredPayload {
    pub banks_user_id: String,
}

/// Payload of `bankreader_required`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankreaderRequiredPayload {
    pub banks_user_id: String,
    #[serde(default)]
    pub temporary_code: Option<String>,
}

impl EventDto {
    /// Decode the payload into the shape expected by the routed handler
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, DomainError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| DomainError::InvalidPayload(e.to_string()))
    }
}
