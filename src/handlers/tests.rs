//! Handler tests
//!
//! Both platforms are replaced by an in-memory fake that records every call
//! in order, so the tests can assert on the exact remote interaction.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use crate::clients::{Aggregator, CanonicalClient, ClientError, DeleteUserRequest};
    use crate::domain::bridge::BridgeUser;
    use crate::domain::{
        AccountDto, AuthenticationResponse, BankreaderRequiredPayload, BanksUser, BanksUserStatus,
        BanksUserUpdate, BridgeAccount, BridgeTransaction, ClientConfig, CreatedAccount,
        DomainError, EventDto, EventName, ResourceLink, ServiceAccount, Subscription,
        TransactionDto,
    };
    use crate::error::AppError;
    use crate::handlers::{BankReaderHandler, WebhookHandler};
    use crate::registry::InMemoryRegistry;

    // =========================================================================
    // Fake platforms
    // =========================================================================

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        GetBanksUser(String),
        UpdateBanksUser(BanksUserUpdate),
        CreateAccounts(Vec<String>),
        CreateTransactions(String, Vec<String>),
        GenerateRedirectUrl,
        GetAccessToken,
        GetAccounts,
        GetTransactions,
        DeleteUser(String),
    }

    #[derive(Default)]
    struct FakePlatforms {
        calls: Mutex<Vec<Call>>,
        accounts: Vec<BridgeAccount>,
        transactions: Vec<BridgeTransaction>,
        fail_on: Option<&'static str>,
    }

    impl FakePlatforms {
        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn fail_if(&self, step: &'static str) -> Result<(), ClientError> {
            if self.fail_on == Some(step) {
                return Err(ClientError::UnexpectedStatus {
                    status: 500,
                    url: step.to_string(),
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn statuses(&self) -> Vec<BanksUserStatus> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::UpdateBanksUser(update) => update.status,
                    _ => None,
                })
                .collect()
        }

        fn created_transactions(&self) -> Vec<(String, Vec<String>)> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::CreateTransactions(account_id, references) => Some((account_id, references)),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl CanonicalClient for FakePlatforms {
        async fn get_banks_user(
            &self,
            _service_account: &ServiceAccount,
            banks_user_id: &str,
        ) -> Result<BanksUser, ClientError> {
            self.record(Call::GetBanksUser(banks_user_id.to_string()));
            self.fail_if("get_banks_user")?;
            Ok(BanksUser {
                id: banks_user_id.to_string(),
                status: Some(BanksUserStatus::New),
                redirect_url: None,
                callback_url: Some("https://callback.example.com".to_string()),
            })
        }

        async fn update_banks_user(
            &self,
            _service_account: &ServiceAccount,
            _banks_user_id: &str,
            update: &BanksUserUpdate,
        ) -> Result<(), ClientError> {
            self.record(Call::UpdateBanksUser(update.clone()));
            self.fail_if("update_banks_user")
        }

        async fn create_accounts(
            &self,
            _service_account: &ServiceAccount,
            _banks_user_id: &str,
            accounts: &[AccountDto],
        ) -> Result<Vec<CreatedAccount>, ClientError> {
            self.record(Call::CreateAccounts(
                accounts.iter().map(|a| a.reference.clone()).collect(),
            ));
            self.fail_if("create_accounts")?;
            Ok(accounts
                .iter()
                .map(|a| CreatedAccount {
                    id: format!("algoan-{}", a.reference),
                    reference: a.reference.clone(),
                })
                .collect())
        }

        async fn create_transactions(
            &self,
            _service_account: &ServiceAccount,
            _banks_user_id: &str,
            account_id: &str,
            transactions: &[TransactionDto],
        ) -> Result<(), ClientError> {
            self.record(Call::CreateTransactions(
                account_id.to_string(),
                transactions.iter().map(|t| t.reference.clone()).collect(),
            ));
            self.fail_if("create_transactions")
        }
    }

    #[async_trait]
    impl Aggregator for FakePlatforms {
        async fn generate_redirect_url(
            &self,
            banks_user: &BanksUser,
            _config: &ClientConfig,
        ) -> Result<String, ClientError> {
            self.record(Call::GenerateRedirectUrl);
            self.fail_if("generate_redirect_url")?;
            Ok(format!("https://connect.bridgeapi.io/{}", banks_user.id))
        }

        async fn get_access_token(
            &self,
            _banks_user: &BanksUser,
            _config: &ClientConfig,
        ) -> Result<AuthenticationResponse, ClientError> {
            self.record(Call::GetAccessToken);
            self.fail_if("get_access_token")?;
            Ok(AuthenticationResponse {
                access_token: "bridge-token".to_string(),
                expires_at: None,
                user: BridgeUser {
                    uuid: "bridge-user-uuid".to_string(),
                    email: None,
                },
            })
        }

        async fn get_accounts(
            &self,
            _access_token: &str,
            _config: &ClientConfig,
        ) -> Result<Vec<BridgeAccount>, ClientError> {
            self.record(Call::GetAccounts);
            self.fail_if("get_accounts")?;
            Ok(self.accounts.clone())
        }

        async fn get_transactions(
            &self,
            _access_token: &str,
            _config: &ClientConfig,
        ) -> Result<Vec<BridgeTransaction>, ClientError> {
            self.record(Call::GetTransactions);
            self.fail_if("get_transactions")?;
            Ok(self.transactions.clone())
        }

        async fn delete_user(
            &self,
            request: DeleteUserRequest<'_>,
            _config: &ClientConfig,
        ) -> Result<(), ClientError> {
            self.record(Call::DeleteUser(request.bridge_user_id.to_string()));
            self.fail_if("delete_user")
        }

        async fn get_resource_name(
            &self,
            _access_token: &str,
            resource_uri: &str,
            _config: &ClientConfig,
        ) -> Result<String, ClientError> {
            self.fail_if("get_resource_name")?;
            Ok(format!("name-of:{}", resource_uri))
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    const SECRET: &str = "subscription-secret";

    fn link(id: i64, uri: String) -> ResourceLink {
        ResourceLink {
            id,
            resource_uri: uri,
            resource_type: None,
        }
    }

    fn account(id: i64) -> BridgeAccount {
        BridgeAccount {
            id,
            name: format!("Account {}", id),
            balance: dec!(100),
            status: 0,
            updated_at: Some("2019-04-06T13:53:12Z".to_string()),
            account_type: "checking".to_string(),
            currency_code: "EUR".to_string(),
            bank: link(408, "/v2/banks/408".to_string()),
            loan_details: None,
            is_pro: false,
            iban: None,
        }
    }

    fn transaction(id: i64, account_id: i64) -> BridgeTransaction {
        BridgeTransaction {
            id,
            description: format!("Transaction {}", id),
            raw_description: format!("RAW TRANSACTION {}", id),
            amount: dec!(-12.5),
            date: "2019-04-06".to_string(),
            currency_code: None,
            category: link(1, "/v2/categories/1".to_string()),
            account: link(account_id, format!("/v2/accounts/{}", account_id)),
        }
    }

    fn service_account() -> ServiceAccount {
        ServiceAccount {
            id: "sa-1".to_string(),
            client_id: "algoan-client".to_string(),
            client_secret: "algoan-secret".to_string(),
            config: ClientConfig {
                client_id: "bridge-client".to_string(),
                client_secret: "bridge-secret".to_string(),
                bankin_version: "2019-02-18".to_string(),
            },
            subscriptions: vec![
                Subscription {
                    id: "sub-link".to_string(),
                    event_name: EventName::BankreaderLinkRequired,
                    target: "https://connector.example.com/hooks".to_string(),
                    secret: SECRET.to_string(),
                    status: None,
                },
                Subscription {
                    id: "sub-sync".to_string(),
                    event_name: EventName::BankreaderRequired,
                    target: "https://connector.example.com/hooks".to_string(),
                    secret: SECRET.to_string(),
                    status: None,
                },
            ],
        }
    }

    fn payload() -> BankreaderRequiredPayload {
        BankreaderRequiredPayload {
            banks_user_id: "bu-1".to_string(),
            temporary_code: None,
        }
    }

    fn event(subscription_id: &str, event_name: &str, payload: serde_json::Value) -> EventDto {
        serde_json::from_value(serde_json::json!({
            "subscription": { "id": subscription_id, "eventName": event_name },
            "payload": payload,
        }))
        .unwrap()
    }

    fn sign(payload: &serde_json::Value) -> String {
        service_account().subscriptions[0].sign(payload).unwrap()
    }

    fn dispatcher(platforms: Arc<FakePlatforms>) -> WebhookHandler {
        WebhookHandler::new(
            Arc::new(InMemoryRegistry::new(vec![service_account()])),
            platforms.clone(),
            platforms,
        )
    }

    fn bank_reader(platforms: &Arc<FakePlatforms>) -> BankReaderHandler {
        BankReaderHandler::new(platforms.clone(), platforms.clone())
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    #[tokio::test]
    async fn test_sync_reports_statuses_in_order() {
        let platforms = Arc::new(FakePlatforms {
            accounts: vec![account(1)],
            transactions: vec![transaction(10, 1)],
            ..FakePlatforms::default()
        });

        bank_reader(&platforms)
            .execute(&service_account(), &payload())
            .await
            .unwrap();

        assert_eq!(
            platforms.statuses(),
            vec![
                BanksUserStatus::Synchronizing,
                BanksUserStatus::AccountsSynchronized,
                BanksUserStatus::Finished,
            ]
        );
    }

    #[tokio::test]
    async fn test_sync_call_sequence() {
        let platforms = Arc::new(FakePlatforms {
            accounts: vec![account(1)],
            transactions: vec![transaction(10, 1)],
            ..FakePlatforms::default()
        });

        bank_reader(&platforms)
            .execute(&service_account(), &payload())
            .await
            .unwrap();

        assert_eq!(
            platforms.calls(),
            vec![
                Call::GetBanksUser("bu-1".to_string()),
                Call::UpdateBanksUser(BanksUserUpdate::status(BanksUserStatus::Synchronizing)),
                Call::GetAccessToken,
                Call::GetAccounts,
                Call::CreateAccounts(vec!["1".to_string()]),
                Call::UpdateBanksUser(BanksUserUpdate::status(
                    BanksUserStatus::AccountsSynchronized
                )),
                Call::GetTransactions,
                Call::CreateTransactions("algoan-1".to_string(), vec!["10".to_string()]),
                Call::UpdateBanksUser(BanksUserUpdate::status(BanksUserStatus::Finished)),
                Call::DeleteUser("bridge-user-uuid".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_transactions_are_partitioned_by_account() {
        let platforms = Arc::new(FakePlatforms {
            accounts: vec![account(1), account(2)],
            transactions: vec![
                transaction(10, 1),
                transaction(11, 2),
                transaction(12, 1),
                transaction(13, 3),
                transaction(14, 2),
            ],
            ..FakePlatforms::default()
        });

        bank_reader(&platforms)
            .execute(&service_account(), &payload())
            .await
            .unwrap();

        let created = platforms.created_transactions();
        assert_eq!(created.len(), 2);
        assert!(created.contains(&(
            "algoan-1".to_string(),
            vec!["10".to_string(), "12".to_string()]
        )));
        assert!(created.contains(&(
            "algoan-2".to_string(),
            vec!["11".to_string(), "14".to_string()]
        )));

        // Nothing duplicated across accounts
        let mut all: Vec<String> = created.into_iter().flat_map(|(_, refs)| refs).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_account_without_transactions_gets_empty_batch() {
        let platforms = Arc::new(FakePlatforms {
            accounts: vec![account(1)],
            transactions: vec![transaction(10, 2)],
            ..FakePlatforms::default()
        });

        bank_reader(&platforms)
            .execute(&service_account(), &payload())
            .await
            .unwrap();

        assert_eq!(
            platforms.created_transactions(),
            vec![("algoan-1".to_string(), Vec::<String>::new())]
        );
    }

    #[tokio::test]
    async fn test_transaction_fetch_failure_aborts_sync() {
        let platforms = Arc::new(FakePlatforms {
            accounts: vec![account(1)],
            transactions: vec![transaction(10, 1)],
            fail_on: Some("get_transactions"),
            ..FakePlatforms::default()
        });

        let result = bank_reader(&platforms)
            .execute(&service_account(), &payload())
            .await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(
            platforms.statuses(),
            vec![
                BanksUserStatus::Synchronizing,
                BanksUserStatus::AccountsSynchronized,
            ]
        );
        assert!(!platforms
            .calls()
            .iter()
            .any(|call| matches!(call, Call::DeleteUser(_) | Call::CreateTransactions(..))));
    }

    #[tokio::test]
    async fn test_account_creation_failure_keeps_synchronizing_status() {
        let platforms = Arc::new(FakePlatforms {
            accounts: vec![account(1)],
            fail_on: Some("create_accounts"),
            ..FakePlatforms::default()
        });

        let result = bank_reader(&platforms)
            .execute(&service_account(), &payload())
            .await;

        assert!(result.is_err());
        assert_eq!(platforms.statuses(), vec![BanksUserStatus::Synchronizing]);
        assert!(!platforms.calls().contains(&Call::GetTransactions));
    }

    #[tokio::test]
    async fn test_lookup_failure_submits_nothing() {
        let platforms = Arc::new(FakePlatforms {
            accounts: vec![account(1), account(2)],
            fail_on: Some("get_resource_name"),
            ..FakePlatforms::default()
        });

        let result = bank_reader(&platforms)
            .execute(&service_account(), &payload())
            .await;

        assert!(result.is_err());
        assert!(!platforms
            .calls()
            .iter()
            .any(|call| matches!(call, Call::CreateAccounts(_))));
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    #[tokio::test]
    async fn test_bad_signature_is_unauthorized_without_calls() {
        let platforms = Arc::new(FakePlatforms::default());
        let body = serde_json::json!({ "banksUserId": "bu-1" });
        let event = event("sub-sync", "bankreader_required", body);

        let result = dispatcher(platforms.clone())
            .handle(&event, "sha256=deadbeef")
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::InvalidSignature))
        ));
        assert!(platforms.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_subscription_is_unauthorized() {
        let platforms = Arc::new(FakePlatforms::default());
        let body = serde_json::json!({ "banksUserId": "bu-1" });
        let signature = sign(&body);
        let event = event("sub-unknown", "bankreader_required", body);

        let result = dispatcher(platforms.clone()).handle(&event, &signature).await;

        match result {
            Err(AppError::Domain(DomainError::UnknownSubscription(id))) => {
                assert_eq!(id, "sub-unknown");
            }
            other => panic!("Expected UnknownSubscription, got: {:?}", other),
        }
        assert!(platforms.calls().is_empty());
    }

    #[tokio::test]
    async fn test_link_required_publishes_redirect_url() {
        let platforms = Arc::new(FakePlatforms::default());
        let body = serde_json::json!({ "banksUserId": "bu-7" });
        let signature = sign(&body);
        let event = event("sub-link", "bankreader_link_required", body);

        dispatcher(platforms.clone())
            .handle(&event, &signature)
            .await
            .unwrap();

        assert_eq!(
            platforms.calls(),
            vec![
                Call::GetBanksUser("bu-7".to_string()),
                Call::GenerateRedirectUrl,
                Call::UpdateBanksUser(BanksUserUpdate::redirect_url(
                    "https://connect.bridgeapi.io/bu-7"
                )),
            ]
        );
    }

    #[tokio::test]
    async fn test_link_required_failure_propagates() {
        let platforms = Arc::new(FakePlatforms {
            fail_on: Some("generate_redirect_url"),
            ..FakePlatforms::default()
        });
        let body = serde_json::json!({ "banksUserId": "bu-7" });
        let signature = sign(&body);
        let event = event("sub-link", "bankreader_link_required", body);

        let result = dispatcher(platforms.clone()).handle(&event, &signature).await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert!(!platforms
            .calls()
            .iter()
            .any(|call| matches!(call, Call::UpdateBanksUser(_))));
    }

    #[tokio::test]
    async fn test_bankreader_required_runs_sync() {
        let platforms = Arc::new(FakePlatforms {
            accounts: vec![account(1)],
            ..FakePlatforms::default()
        });
        let body = serde_json::json!({ "banksUserId": "bu-1", "temporaryCode": "abc" });
        let signature = sign(&body);
        let event = event("sub-sync", "bankreader_required", body);

        dispatcher(platforms.clone())
            .handle(&event, &signature)
            .await
            .unwrap();

        assert_eq!(platforms.statuses().last(), Some(&BanksUserStatus::Finished));
    }

    #[tokio::test]
    async fn test_unhandled_event_is_ignored() {
        let platforms = Arc::new(FakePlatforms::default());
        let body = serde_json::json!({ "banksUserId": "bu-1" });
        let signature = sign(&body);
        let event = event("sub-sync", "bankreader_configuration_required", body);

        dispatcher(platforms.clone())
            .handle(&event, &signature)
            .await
            .unwrap();

        assert!(platforms.calls().is_empty());
    }

    #[tokio::test]
    async fn test_payload_without_banks_user_is_bad_request() {
        let platforms = Arc::new(FakePlatforms::default());
        let body = serde_json::json!({ "somethingElse": 1 });
        let signature = sign(&body);
        let event = event("sub-sync", "bankreader_required", body);

        let result = dispatcher(platforms.clone()).handle(&event, &signature).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::InvalidPayload(_)))
        ));
        assert!(platforms.calls().is_empty());
    }
}
