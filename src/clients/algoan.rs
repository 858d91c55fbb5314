//! Algoan API client
//!
//! OAuth2 client-credentials authentication with a per-client token cache,
//! banks-user endpoints used by the handlers, and the service-account and
//! subscription endpoints used to bootstrap the registry.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{CanonicalClient, ClientError, ServiceAccountSource};
use crate::domain::{
    AccountDto, BanksUser, BanksUserUpdate, ClientConfig, CreatedAccount, EventName,
    ServiceAccount, Subscription, TransactionDto,
};

/// Tokens are refreshed this long before Algoan expires them
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Service account as listed by `GET /v1/service-accounts`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawServiceAccount {
    id: String,
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    config: Option<ClientConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewSubscription<'a> {
    target: &'a str,
    event_name: EventName,
    secret: &'a str,
}

/// reqwest-backed Algoan client
pub struct AlgoanHttpClient {
    http: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    tokens: Mutex<HashMap<String, CachedToken>>,
}

impl AlgoanHttpClient {
    /// `client_id`/`client_secret` are the connector's own credentials,
    /// used to list its service accounts.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tokens: Mutex::new(HashMap::new()),
        })
    }

    async fn access_token(&self, client_id: &str, client_secret: &str) -> Result<String, ClientError> {
        let mut tokens = self.tokens.lock().await;
        let now = Utc::now();

        if let Some(cached) = tokens.get(client_id).filter(|t| t.is_fresh(now)) {
            return Ok(cached.access_token.clone());
        }

        debug!(client_id = %client_id, "Requesting Algoan access token");
        let response = self
            .http
            .post(format!("{}/v1/oauth/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }
        let token: TokenResponse = response.json().await?;

        tokens.insert(
            client_id.to_string(),
            CachedToken {
                access_token: token.access_token.clone(),
                expires_at: now + chrono::Duration::seconds(token.expires_in),
            },
        );

        Ok(token.access_token)
    }

    async fn authorized(
        &self,
        method: Method,
        path: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<RequestBuilder, ClientError> {
        let token = self.access_token(client_id, client_secret).await?;
        Ok(self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token))
    }

    async fn as_service_account(
        &self,
        method: Method,
        path: &str,
        service_account: &ServiceAccount,
    ) -> Result<RequestBuilder, ClientError> {
        self.authorized(
            method,
            path,
            &service_account.client_id,
            &service_account.client_secret,
        )
        .await
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }
        Ok(response.json().await?)
    }

    async fn send_empty(builder: RequestBuilder) -> Result<(), ClientError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceAccountSource for AlgoanHttpClient {
    /// List the connector's service accounts, without their subscriptions.
    ///
    /// Service accounts with no Bridge configuration cannot be served and
    /// are skipped.
    async fn list_service_accounts(&self) -> Result<Vec<ServiceAccount>, ClientError> {
        let builder = self
            .authorized(
                Method::GET,
                "/v1/service-accounts",
                &self.client_id,
                &self.client_secret,
            )
            .await?;
        let raw: Vec<RawServiceAccount> = Self::send_json(builder).await?;

        Ok(raw
            .into_iter()
            .filter_map(|sa| match sa.config {
                Some(config) => Some(ServiceAccount {
                    id: sa.id,
                    client_id: sa.client_id,
                    client_secret: sa.client_secret,
                    config,
                    subscriptions: Vec::new(),
                }),
                None => {
                    warn!(service_account_id = %sa.id, "Service account has no Bridge configuration, skipping");
                    None
                }
            })
            .collect())
    }

    async fn list_subscriptions(
        &self,
        service_account: &ServiceAccount,
    ) -> Result<Vec<Subscription>, ClientError> {
        let builder = self
            .as_service_account(Method::GET, "/v1/subscriptions", service_account)
            .await?;
        Self::send_json(builder).await
    }

    async fn create_subscription(
        &self,
        service_account: &ServiceAccount,
        target: &str,
        event_name: EventName,
        secret: &str,
    ) -> Result<Subscription, ClientError> {
        let builder = self
            .as_service_account(Method::POST, "/v1/subscriptions", service_account)
            .await?
            .json(&NewSubscription {
                target,
                event_name,
                secret,
            });
        let mut created: Subscription = Self::send_json(builder).await?;
        if created.secret.is_empty() {
            created.secret = secret.to_string();
        }
        Ok(created)
    }
}

#[async_trait]
impl CanonicalClient for AlgoanHttpClient {
    async fn get_banks_user(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
    ) -> Result<BanksUser, ClientError> {
        let builder = self
            .as_service_account(
                Method::GET,
                &format!("/v1/banks-users/{}", banks_user_id),
                service_account,
            )
            .await?;
        Self::send_json(builder).await
    }

    async fn update_banks_user(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
        update: &BanksUserUpdate,
    ) -> Result<(), ClientError> {
        let builder = self
            .as_service_account(
                Method::PATCH,
                &format!("/v1/banks-users/{}", banks_user_id),
                service_account,
            )
            .await?
            .json(update);
        Self::send_empty(builder).await
    }

    async fn create_accounts(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
        accounts: &[AccountDto],
    ) -> Result<Vec<CreatedAccount>, ClientError> {
        let builder = self
            .as_service_account(
                Method::POST,
                &format!("/v1/banks-users/{}/accounts", banks_user_id),
                service_account,
            )
            .await?
            .json(accounts);
        Self::send_json(builder).await
    }

    async fn create_transactions(
        &self,
        service_account: &ServiceAccount,
        banks_user_id: &str,
        account_id: &str,
        transactions: &[TransactionDto],
    ) -> Result<(), ClientError> {
        let builder = self
            .as_service_account(
                Method::POST,
                &format!(
                    "/v1/banks-users/{}/accounts/{}/transactions",
                    banks_user_id, account_id
                ),
                service_account,
            )
            .await?
            .json(transactions);
        Self::send_empty(builder).await
    }
}
