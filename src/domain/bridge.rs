//! Bridge Types
//!
//! Raw records returned by the Bridge aggregation API.
//! They are read-only inputs for the field mapper.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bridge status code for an account that refreshed correctly
pub const BRIDGE_ACCOUNT_STATUS_OK: i32 = 0;

/// Bridge API credentials attached to a service account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_bankin_version")]
    pub bankin_version: String,
}

fn default_bankin_version() -> String {
    "2019-02-18".to_string()
}

/// Link to another Bridge resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub id: i64,
    pub resource_uri: String,
    #[serde(default)]
    pub resource_type: Option<String>,
}

/// Loan data carried by loan accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeLoanDetails {
    #[serde(default)]
    pub next_payment_date: Option<String>,
    #[serde(default)]
    pub next_payment_amount: Option<Decimal>,
    #[serde(default)]
    pub maturity_date: Option<String>,
    #[serde(default)]
    pub opening_date: Option<String>,
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    #[serde(default)]
    pub borrowed_capital: Option<Decimal>,
    #[serde(default)]
    pub repaid_capital: Option<Decimal>,
    #[serde(default)]
    pub remaining_capital: Option<Decimal>,
}

/// Bank account as exposed by `GET /v2/accounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeAccount {
    pub id: i64,
    pub name: String,
    pub balance: Decimal,
    pub status: i32,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Kept as a raw string: unknown account types must still deserialize
    #[serde(rename = "type")]
    pub account_type: String,
    pub currency_code: String,
    pub bank: ResourceLink,
    #[serde(default)]
    pub loan_details: Option<BridgeLoanDetails>,
    #[serde(default)]
    pub is_pro: bool,
    #[serde(default)]
    pub iban: Option<String>,
}

/// Transaction as exposed by `GET /v2/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeTransaction {
    pub id: i64,
    pub description: String,
    pub raw_description: String,
    pub amount: Decimal,
    pub date: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    pub category: ResourceLink,
    pub account: ResourceLink,
}

/// Bridge user reference returned on authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeUser {
    pub uuid: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response of `POST /v2/authenticate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    pub user: BridgeUser,
}

/// Paginated list envelope used by Bridge list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub resources: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next_uri: Option<String>,
}

/// Resource with a display name (banks, categories)
#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
}
