//! Bridge API client
//!
//! Talks to the Bridge v2 REST API. Every request carries the tenant's
//! `Client-Id`, `Client-Secret` and `Bankin-Version` headers; user-scoped
//! requests add the bearer access token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{Aggregator, ClientError, DeleteUserRequest};
use crate::domain::bridge::{ListResponse, NamedResource};
use crate::domain::{
    AuthenticationResponse, BanksUser, BridgeAccount, BridgeTransaction, ClientConfig,
};

/// Page size requested on list endpoints
const PAGE_LIMIT: u32 = 500;

/// Bridge credentials derived for a banks user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

impl UserCredentials {
    /// Derive stable Bridge credentials from the Algoan banks user id
    pub fn for_banks_user(banks_user_id: &str, salt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(banks_user_id.as_bytes());
        hasher.update(salt.as_bytes());

        Self {
            email: format!("{}@algoan-bridge.com", banks_user_id),
            password: hex::encode(hasher.finalize()),
        }
    }
}

/// reqwest-backed Bridge client
#[derive(Clone)]
pub struct BridgeHttpClient {
    http: Client,
    base_url: String,
    password_salt: String,
}

impl BridgeHttpClient {
    pub fn new(
        base_url: impl Into<String>,
        password_salt: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            password_salt: password_salt.into(),
        })
    }

    fn credentials(&self, banks_user: &BanksUser) -> UserCredentials {
        UserCredentials::for_banks_user(&banks_user.id, &self.password_salt)
    }

    /// `uri` is either a path (`/v2/accounts`) or a Bridge resource URI
    fn request(
        &self,
        method: Method,
        uri: &str,
        config: &ClientConfig,
        access_token: Option<&str>,
    ) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, uri))
            .header("Client-Id", &config.client_id)
            .header("Client-Secret", &config.client_secret)
            .header("Bankin-Version", &config.bankin_version);

        match access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }
        Ok(response.json().await?)
    }

    async fn authenticate(
        &self,
        credentials: &UserCredentials,
        config: &ClientConfig,
    ) -> Result<AuthenticationResponse, ClientError> {
        let builder = self
            .request(Method::POST, "/v2/authenticate", config, None)
            .json(&json!({ "email": credentials.email, "password": credentials.password }));

        Self::send_json(builder).await
    }

    /// Register the user, tolerating a user that already exists
    async fn register(
        &self,
        credentials: &UserCredentials,
        config: &ClientConfig,
    ) -> Result<(), ClientError> {
        let response = self
            .request(Method::POST, "/v2/users", config, None)
            .json(&json!({ "email": credentials.email, "password": credentials.password }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            debug!(email = %credentials.email, "Bridge user already registered");
            return Ok(());
        }
        if !status.is_success() {
            return Err(ClientError::from_response(response).await);
        }
        Ok(())
    }

    /// Walk `pagination.next_uri` and concatenate every page in order
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        first_uri: String,
        access_token: &str,
        config: &ClientConfig,
    ) -> Result<Vec<T>, ClientError> {
        let mut resources = Vec::new();
        let mut next = Some(first_uri);

        while let Some(uri) = next {
            let page: ListResponse<T> =
                Self::send_json(self.request(Method::GET, &uri, config, Some(access_token))).await?;
            resources.extend(page.resources);
            next = page.pagination.and_then(|p| p.next_uri);
        }

        Ok(resources)
    }
}

#[derive(serde::Deserialize)]
struct ConnectUrlResponse {
    redirect_url: String,
}

#[async_trait]
impl Aggregator for BridgeHttpClient {
    async fn generate_redirect_url(
        &self,
        banks_user: &BanksUser,
        config: &ClientConfig,
    ) -> Result<String, ClientError> {
        let credentials = self.credentials(banks_user);
        self.register(&credentials, config).await?;
        let auth = self.authenticate(&credentials, config).await?;

        let builder = self
            .request(
                Method::GET,
                "/v2/connect/items/add/url",
                config,
                Some(&auth.access_token),
            )
            .query(&[("country", "fr"), ("context", banks_user.id.as_str())]);

        let response: ConnectUrlResponse = Self::send_json(builder).await?;
        if response.redirect_url.is_empty() {
            return Err(ClientError::NoData("redirect_url".to_string()));
        }
        Ok(response.redirect_url)
    }

    async fn get_access_token(
        &self,
        banks_user: &BanksUser,
        config: &ClientConfig,
    ) -> Result<AuthenticationResponse, ClientError> {
        self.authenticate(&self.credentials(banks_user), config).await
    }

    async fn get_accounts(
        &self,
        access_token: &str,
        config: &ClientConfig,
    ) -> Result<Vec<BridgeAccount>, ClientError> {
        self.fetch_all(format!("/v2/accounts?limit={}", PAGE_LIMIT), access_token, config)
            .await
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        config: &ClientConfig,
    ) -> Result<Vec<BridgeTransaction>, ClientError> {
        self.fetch_all(format!("/v2/transactions?limit={}", PAGE_LIMIT), access_token, config)
            .await
    }

    async fn delete_user(
        &self,
        request: DeleteUserRequest<'_>,
        config: &ClientConfig,
    ) -> Result<(), ClientError> {
        let credentials = self.credentials(request.banks_user);
        let response = self
            .request(
                Method::DELETE,
                &format!("/v2/users/{}", request.bridge_user_id),
                config,
                Some(request.access_token),
            )
            .json(&json!({ "password": credentials.password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }
        Ok(())
    }

    async fn get_resource_name(
        &self,
        access_token: &str,
        resource_uri: &str,
        config: &ClientConfig,
    ) -> Result<String, ClientError> {
        let resource: NamedResource = Self::send_json(self.request(
            Method::GET,
            resource_uri,
            config,
            Some(access_token),
        ))
        .await?;

        Ok(resource.name)
    }
}
