//! Synchronization Handler
//!
//! Handles `bankreader_required`: copies the user's Bridge accounts and
//! transactions into Algoan, reporting progress on the banks user status,
//! then removes the user from Bridge.
//!
//! Every step is awaited before the next one starts. A failing step aborts
//! the run and nothing is rolled back: the banks user keeps the last status
//! that was reported.

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::{Aggregator, CanonicalClient, DeleteUserRequest};
use crate::domain::{
    BankreaderRequiredPayload, BanksUserStatus, BanksUserUpdate, BridgeTransaction,
    CreatedAccount, ServiceAccount,
};
use crate::error::AppResult;
use crate::mapping::{map_bridge_accounts, map_bridge_transactions};

/// Handler for `bankreader_required`
pub struct BankReaderHandler {
    canonical: Arc<dyn CanonicalClient>,
    aggregator: Arc<dyn Aggregator>,
}

impl BankReaderHandler {
    pub fn new(canonical: Arc<dyn CanonicalClient>, aggregator: Arc<dyn Aggregator>) -> Self {
        Self {
            canonical,
            aggregator,
        }
    }

    /// Run the synchronization for the banks user named in `payload`
    pub async fn execute(
        &self,
        service_account: &ServiceAccount,
        payload: &BankreaderRequiredPayload,
    ) -> AppResult<()> {
        let config = &service_account.config;
        let aggregator = self.aggregator.as_ref();

        let banks_user = self
            .canonical
            .get_banks_user(service_account, &payload.banks_user_id)
            .await?;

        self.report_status(service_account, &banks_user.id, BanksUserStatus::Synchronizing)
            .await?;

        let authentication = aggregator.get_access_token(&banks_user, config).await?;
        let access_token = authentication.access_token.as_str();
        let bridge_user_id = authentication.user.uuid.as_str();

        // Accounts
        let accounts = aggregator.get_accounts(access_token, config).await?;
        debug!(
            banks_user_id = %banks_user.id,
            accounts = accounts.len(),
            "Bridge accounts retrieved"
        );
        let algoan_accounts =
            map_bridge_accounts(&accounts, access_token, aggregator, config).await?;
        let created_accounts = self
            .canonical
            .create_accounts(service_account, &banks_user.id, &algoan_accounts)
            .await?;
        debug!(
            banks_user_id = %banks_user.id,
            accounts = created_accounts.len(),
            "Algoan accounts created"
        );

        self.report_status(
            service_account,
            &banks_user.id,
            BanksUserStatus::AccountsSynchronized,
        )
        .await?;

        // Transactions, fetched once for the whole user
        let transactions = aggregator.get_transactions(access_token, config).await?;
        debug!(
            banks_user_id = %banks_user.id,
            transactions = transactions.len(),
            "Bridge transactions retrieved"
        );

        for account in &created_accounts {
            let account_transactions = transactions_of(&transactions, account);
            let algoan_transactions =
                map_bridge_transactions(&account_transactions, access_token, aggregator, config)
                    .await?;
            self.canonical
                .create_transactions(
                    service_account,
                    &banks_user.id,
                    &account.id,
                    &algoan_transactions,
                )
                .await?;
            debug!(
                banks_user_id = %banks_user.id,
                account_id = %account.id,
                transactions = algoan_transactions.len(),
                "Algoan transactions created"
            );
        }

        self.report_status(service_account, &banks_user.id, BanksUserStatus::Finished)
            .await?;

        aggregator
            .delete_user(
                DeleteUserRequest {
                    bridge_user_id,
                    banks_user: &banks_user,
                    access_token,
                },
                config,
            )
            .await?;

        info!(
            banks_user_id = %banks_user.id,
            accounts = created_accounts.len(),
            transactions = transactions.len(),
            "Synchronization finished"
        );

        Ok(())
    }

    async fn report_status(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
        status: BanksUserStatus,
    ) -> AppResult<()> {
        self.canonical
            .update_banks_user(service_account, banks_user_id, &BanksUserUpdate::status(status))
            .await?;
        debug!(banks_user_id = %banks_user_id, status = ?status, "Banks user status reported");
        Ok(())
    }
}

/// Transactions of `account`, in fetch order.
///
/// A reference that is not a Bridge account id matches nothing.
fn transactions_of(
    transactions: &[BridgeTransaction],
    account: &CreatedAccount,
) -> Vec<BridgeTransaction> {
    let Ok(bridge_account_id) = account.reference.parse::<i64>() else {
        return Vec::new();
    };

    transactions
        .iter()
        .filter(|transaction| transaction.account.id == bridge_account_id)
        .cloned()
        .collect()
}
