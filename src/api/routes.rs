//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};

use crate::domain::EventDto;
use crate::error::AppError;
use crate::handlers::WebhookHandler;

/// Header carrying the Algoan event signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Shared state of the HTTP layer
#[derive(Clone)]
pub struct AppState {
    pub webhook: Arc<WebhookHandler>,
}

impl AppState {
    pub fn new(webhook: WebhookHandler) -> Self {
        Self {
            webhook: Arc::new(webhook),
        }
    }
}

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new().route("/hooks", post(handle_webhook))
}

// =========================================================================
// POST /hooks
// =========================================================================

/// Receive an Algoan event.
///
/// A missing signature header is checked as an empty signature, so it is
/// rejected as unauthorized like any other mismatch.
async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<EventDto>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(event) = body.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    tracing::debug!(
        subscription_id = %event.subscription.id,
        event_name = event.subscription.event_name.as_str(),
        "Received webhook event"
    );

    state.webhook.handle(&event, signature).await?;

    Ok(StatusCode::NO_CONTENT)
}
