//! Common test utilities
//!
//! In-memory stand-ins for Algoan and Bridge, plus helpers to build the
//! router around them and to sign events the way Algoan does.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use algoan_bridge_connector::api::{self, AppState};
use algoan_bridge_connector::clients::{Aggregator, CanonicalClient, ClientError, DeleteUserRequest};
use algoan_bridge_connector::domain::bridge::BridgeUser;
use algoan_bridge_connector::domain::{
    AccountDto, AuthenticationResponse, BanksUser, BanksUserStatus, BanksUserUpdate,
    BridgeAccount, BridgeTransaction, ClientConfig, CreatedAccount, TransactionDto,
};
use algoan_bridge_connector::{
    EventName, InMemoryRegistry, ServiceAccount, Subscription, WebhookHandler,
};

pub const SECRET: &str = "test-subscription-secret";
pub const LINK_SUBSCRIPTION: &str = "sub-link-required";
pub const SYNC_SUBSCRIPTION: &str = "sub-bankreader-required";

/// Records the remote calls made by the connector
#[derive(Default)]
pub struct FakePlatforms {
    pub calls: Mutex<Vec<String>>,
    pub fail_redirect: bool,
}

impl FakePlatforms {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CanonicalClient for FakePlatforms {
    async fn get_banks_user(
        &self,
        _service_account: &ServiceAccount,
        banks_user_id: &str,
    ) -> Result<BanksUser, ClientError> {
        self.record(format!("get_banks_user:{}", banks_user_id));
        Ok(BanksUser {
            id: banks_user_id.to_string(),
            status: Some(BanksUserStatus::New),
            redirect_url: None,
            callback_url: None,
        })
    }

    async fn update_banks_user(
        &self,
        _service_account: &ServiceAccount,
        banks_user_id: &str,
        update: &BanksUserUpdate,
    ) -> Result<(), ClientError> {
        self.record(format!("update_banks_user:{}:{:?}", banks_user_id, update.status));
        Ok(())
    }

    async fn create_accounts(
        &self,
        _service_account: &ServiceAccount,
        _banks_user_id: &str,
        accounts: &[AccountDto],
    ) -> Result<Vec<CreatedAccount>, ClientError> {
        self.record("create_accounts");
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
        _transactions: &[TransactionDto],
    ) -> Result<(), ClientError> {
        self.record(format!("create_transactions:{}", account_id));
        Ok(())
    }
}

#[async_trait]
impl Aggregator for FakePlatforms {
    async fn generate_redirect_url(
        &self,
        banks_user: &BanksUser,
        _config: &ClientConfig,
    ) -> Result<String, ClientError> {
        self.record("generate_redirect_url");
        if self.fail_redirect {
            return Err(ClientError::NoData("redirect_url".to_string()));
        }
        Ok(format!("https://connect.bridgeapi.io/{}", banks_user.id))
    }

    async fn get_access_token(
        &self,
        _banks_user: &BanksUser,
        _config: &ClientConfig,
    ) -> Result<AuthenticationResponse, ClientError> {
        self.record("get_access_token");
        Ok(AuthenticationResponse {
            access_token: "bridge-token".to_string(),
            expires_at: None,
            user: BridgeUser {
                uuid: "bridge-user".to_string(),
                email: None,
            },
        })
    }

    async fn get_accounts(
        &self,
        _access_token: &str,
        _config: &ClientConfig,
    ) -> Result<Vec<BridgeAccount>, ClientError> {
        self.record("get_accounts");
        Ok(Vec::new())
    }

    async fn get_transactions(
        &self,
        _access_token: &str,
        _config: &ClientConfig,
    ) -> Result<Vec<BridgeTransaction>, ClientError> {
        self.record("get_transactions");
        Ok(Vec::new())
    }

    async fn delete_user(
        &self,
        request: DeleteUserRequest<'_>,
        _config: &ClientConfig,
    ) -> Result<(), ClientError> {
        self.record(format!("delete_user:{}", request.bridge_user_id));
        Ok(())
    }

    async fn get_resource_name(
        &self,
        _access_token: &str,
        _resource_uri: &str,
        _config: &ClientConfig,
    ) -> Result<String, ClientError> {
        Ok("Bank".to_string())
    }
}

fn subscription(id: &str, event_name: EventName) -> Subscription {
    Subscription {
        id: id.to_string(),
        event_name,
        target: "https://connector.example.com/hooks".to_string(),
        secret: SECRET.to_string(),
        status: None,
    }
}

pub fn service_account() -> ServiceAccount {
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
            subscription(LINK_SUBSCRIPTION, EventName::BankreaderLinkRequired),
            subscription(SYNC_SUBSCRIPTION, EventName::BankreaderRequired),
        ],
    }
}

/// Build the `/hooks` router around `platforms`
pub fn app(platforms: Arc<FakePlatforms>) -> Router {
    let registry = InMemoryRegistry::new(vec![service_account()]);
    let webhook = WebhookHandler::new(Arc::new(registry), platforms.clone(), platforms);

    api::create_router().with_state(AppState::new(webhook))
}

/// Event body as Algoan posts it
pub fn event_body(subscription_id: &str, event_name: &str, payload: &Value) -> String {
    json!({
        "subscription": {
            "id": subscription_id,
            "eventName": event_name,
            "target": "https://connector.example.com/hooks",
            "status": "ACTIVE"
        },
        "payload": payload,
        "id": "event-1",
        "index": 1,
        "time": 1_556_000_000_000_i64
    })
    .to_string()
}

/// Signature header value for `payload` under the test secret
pub fn sign(payload: &Value) -> String {
    subscription(LINK_SUBSCRIPTION, EventName::BankreaderLinkRequired)
        .sign(payload)
        .unwrap()
}
