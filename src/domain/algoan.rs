//! Algoan Types
//!
//! Canonical records exchanged with Algoan: banks users and the
//! account/transaction DTOs produced by the field mapper.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a banks user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BanksUserStatus {
    New,
    Synchronizing,
    AccountsSynchronized,
    Finished,
    Error,
    #[serde(other)]
    Other,
}

/// End user being synchronized, as read from Algoan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanksUser {
    pub id: String,
    #[serde(default)]
    pub status: Option<BanksUserStatus>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

/// Partial update sent with `PATCH /v1/banks-users/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanksUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BanksUserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl BanksUserUpdate {
    pub fn status(status: BanksUserStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn redirect_url(redirect_url: impl Into<String>) -> Self {
        Self {
            redirect_url: Some(redirect_url.into()),
            ..Self::default()
        }
    }
}

/// Canonical account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Checkings,
    Savings,
    CreditCard,
    Loan,
}

/// Canonical account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Manual,
    Active,
    Error,
    NotFound,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Manual => "MANUAL",
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Error => "ERROR",
            AccountStatus::NotFound => "NOT_FOUND",
            AccountStatus::Closed => "CLOSED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageType {
    Personal,
    Professional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanType {
    Auto,
    Consumer,
    Home,
    Student,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    AtmDeposit,
    BankFee,
    Check,
    CreditCardPayment,
    DirectDebit,
    Transfer,
    Unknown,
}

/// Loan section of a canonical account.
///
/// Amounts Bridge leaves null are omitted rather than zeroed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetailsDto {
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_date: DateTime<Utc>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub interest_rate: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub remaining_capital: Option<Decimal>,
    #[serde(rename = "type")]
    pub loan_type: LoanType,
}

/// Account submitted with `POST /v1/banks-users/{id}/accounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub balance_date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub bank: String,
    pub connection_source: String,
    /// `None` when the Bridge type has no canonical counterpart
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    pub currency: String,
    pub name: String,
    pub reference: String,
    pub status: AccountStatus,
    pub usage: UsageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_details: Option<LoanDetailsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_details: Option<String>,
}

/// Transaction submitted with `POST /v1/banks-users/{id}/accounts/{accountId}/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub simplified_description: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banks_user_card_id: Option<String>,
    pub reference: String,
    pub user_description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub date: DateTime<Utc>,
}

/// Account as returned by Algoan after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAccount {
    pub id: String,
    pub reference: String,
}
