//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::clients::ClientError;
use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Event validation errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Collaborator failures, propagated unchanged
    #[error("Upstream failure: {0}")]
    Upstream(#[from] ClientError),
}

impl AppError {
    /// Check if the event was rejected as unauthenticated
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Domain(e) if e.is_unauthorized())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            AppError::Domain(domain_err) => match domain_err {
                DomainError::UnknownSubscription(id) => {
                    (StatusCode::UNAUTHORIZED, "unknown_subscription", Some(id.clone()))
                }
                DomainError::InvalidSignature => {
                    (StatusCode::UNAUTHORIZED, "invalid_signature", None)
                }
                DomainError::InvalidPayload(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_payload", Some(msg.clone()))
                }
            },

            // 502 Bad Gateway
            AppError::Upstream(e) => {
                tracing::error!("Upstream error: {:?}", e);
                (StatusCode::BAD_GATEWAY, "upstream_failure", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
