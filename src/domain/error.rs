//! Domain Error Types
//!
//! Errors raised while validating an inbound event, before any
//! collaborator is called.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// No service account owns the subscription
    #[error("No service account found for subscription {0}")]
    UnknownSubscription(String),

    /// Signature does not match the subscription secret
    #[error("Invalid X-Hub-Signature: you cannot call this API")]
    InvalidSignature,

    /// Payload does not carry what the routed handler needs
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl DomainError {
    /// Check if the caller failed to authenticate
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::UnknownSubscription(_) | Self::InvalidSignature)
    }
}
