//! Outbound collaborators
//!
//! Traits for the two remote platforms the connector talks to, and their
//! reqwest-backed implementations. Handlers only depend on the traits.

pub mod algoan;
pub mod bridge;

use async_trait::async_trait;

use crate::domain::{
    AccountDto, AuthenticationResponse, BanksUser, BanksUserUpdate, BridgeAccount,
    BridgeTransaction, ClientConfig, CreatedAccount, EventName, ServiceAccount, Subscription,
    TransactionDto,
};

pub use algoan::AlgoanHttpClient;
pub use bridge::BridgeHttpClient;

/// Errors raised by remote calls
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No data returned: {0}")]
    NoData(String),
}

impl ClientError {
    /// Build an error from a non-success response, keeping its body for diagnostics
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        ClientError::UnexpectedStatus { status, url, body }
    }
}

/// Everything needed to remove a user from Bridge
#[derive(Debug, Clone, Copy)]
pub struct DeleteUserRequest<'a> {
    pub bridge_user_id: &'a str,
    pub banks_user: &'a BanksUser,
    pub access_token: &'a str,
}

/// Canonical system (Algoan) operations used by the handlers.
///
/// Calls are made on behalf of `service_account`, whose OAuth credentials
/// authenticate the request.
#[async_trait]
pub trait CanonicalClient: Send + Sync {
    async fn get_banks_user(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
    ) -> Result<BanksUser, ClientError>;

    async fn update_banks_user(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
        update: &BanksUserUpdate,
    ) -> Result<(), ClientError>;

    async fn create_accounts(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
        accounts: &[AccountDto],
    ) -> Result<Vec<CreatedAccount>, ClientError>;

    async fn create_transactions(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
        account_id: &str,
        transactions: &[TransactionDto],
    ) -> Result<(), ClientError>;
}

/// Service accounts and subscriptions of the connector on Algoan, read once
/// at startup to build the registry
#[async_trait]
pub trait ServiceAccountSource: Send + Sync {
    /// Service accounts without their subscriptions
    async fn list_service_accounts(&self) -> Result<Vec<ServiceAccount>, ClientError>;

    async fn list_subscriptions(
        &self,
        service_account: &ServiceAccount,
    ) -> Result<Vec<Subscription>, ClientError>;

    async fn create_subscription(
        &self,
        service_account: &ServiceAccount,
        target: &str,
        event_name: EventName,
        secret: &str,
    ) -> Result<Subscription, ClientError>;
}

/// Aggregation provider (Bridge) operations used by the handlers
#[async_trait]
pub trait Aggregator: Send + Sync {
    async fn generate_redirect_url(
        &self,
        banks_user: &BanksUser,
        config: &ClientConfig,
    ) -> Result<String, ClientError>;

    async fn get_access_token(
        &self,
        banks_user: &BanksUser,
        config: &ClientConfig,
    ) -> Result<AuthenticationResponse, ClientError>;

    async fn get_accounts(
        &self,
        access_token: &str,
        config: &ClientConfig,
    ) -> Result<Vec<BridgeAccount>, ClientError>;

    async fn get_transactions(
        &self,
        access_token: &str,
        config: &ClientConfig,
    ) -> Result<Vec<BridgeTransaction>, ClientError>;

    async fn delete_user(
        &self,
        request: DeleteUserRequest<'_>,
        config: &ClientConfig,
    ) -> Result<(), ClientError>;

    /// Resolve the display name of a bank or category resource
    async fn get_resource_name(
        &self,
        access_token: &str,
        resource_uri: &str,
        config: &ClientConfig,
    ) -> Result<String, ClientError>;
}
