//! Link Required Handler
//!
//! Handles `bankreader_link_required`: publishes a Bridge connect URL on the
//! banks user so Algoan can redirect the end user to it.

use std::sync::Arc;

use tracing::debug;

use crate::clients::{Aggregator, CanonicalClient};
use crate::domain::{BankreaderLinkRequiredPayload, BanksUserUpdate, ServiceAccount};
use crate::error::AppResult;

/// Handler for `bankreader_link_required`
pub struct LinkRequiredHandler {
    canonical: Arc<dyn CanonicalClient>,
    aggregator: Arc<dyn Aggregator>,
}

impl LinkRequiredHandler {
    pub fn new(canonical: Arc<dyn CanonicalClient>, aggregator: Arc<dyn Aggregator>) -> Self {
        Self {
            canonical,
            aggregator,
        }
    }

    /// Execute the link generation. No retry: failures reach the caller.
    pub async fn execute(
        &self,
        service_account: &ServiceAccount,
        payload: &BankreaderLinkRequiredPayload,
    ) -> AppResult<()> {
        let banks_user = self
            .canonical
            .get_banks_user(service_account, &payload.banks_user_id)
            .await?;
        debug!(
            banks_user_id = %banks_user.id,
            service_account_id = %service_account.id,
            "Found banks user"
        );

        let redirect_url = self
            .aggregator
            .generate_redirect_url(&banks_user, &service_account.config)
            .await?;

        self.canonical
            .update_banks_user(
                service_account,
                &banks_user.id,
                &BanksUserUpdate::redirect_url(redirect_url.clone()),
            )
            .await?;

        debug!(
            banks_user_id = %banks_user.id,
            redirect_url = %redirect_url,
            "Added redirect url to banks user"
        );

        Ok(())
    }
}
