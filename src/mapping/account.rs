//! Account mapping
//!
//! Bridge accounts to Algoan account DTOs.

use futures::future::try_join_all;

use super::date::to_instant;
use crate::clients::{Aggregator, ClientError};
use crate::domain::bridge::BRIDGE_ACCOUNT_STATUS_OK;
use crate::domain::{
    AccountDto, AccountStatus, AccountType, BridgeAccount, BridgeLoanDetails, ClientConfig,
    LoanDetailsDto, LoanType, UsageType,
};

/// Connection source reported for every account created by this connector
pub const CONNECTION_SOURCE: &str = "BRIDGE";

/// Map a batch of Bridge accounts.
///
/// Bank names are resolved concurrently; the output keeps the input order
/// and the first failed lookup fails the whole batch.
pub async fn map_bridge_accounts(
    accounts: &[BridgeAccount],
    access_token: &str,
    aggregator: &dyn Aggregator,
    config: &ClientConfig,
) -> Result<Vec<AccountDto>, ClientError> {
    try_join_all(
        accounts
            .iter()
            .map(|account| map_bridge_account(account, access_token, aggregator, config)),
    )
    .await
}

async fn map_bridge_account(
    account: &BridgeAccount,
    access_token: &str,
    aggregator: &dyn Aggregator,
    config: &ClientConfig,
) -> Result<AccountDto, ClientError> {
    let bank = aggregator
        .get_resource_name(access_token, &account.bank.resource_uri, config)
        .await?;
    let status = map_account_status(account.status);

    Ok(AccountDto {
        balance_date: to_instant(account.updated_at.as_deref()),
        balance: account.balance,
        bank,
        connection_source: CONNECTION_SOURCE.to_string(),
        account_type: map_account_type(&account.account_type),
        bic: None,
        iban: account.iban.clone(),
        currency: account.currency_code.clone(),
        name: account.name.clone(),
        reference: account.id.to_string(),
        status,
        usage: map_usage(account.is_pro),
        loan_details: account.loan_details.as_ref().map(map_loan_details),
        // Mirrors the account status
        savings_details: Some(status.as_str().to_string()),
    })
}

/// Bridge account type to Algoan account type; `None` when unmapped
pub fn map_account_type(bridge_type: &str) -> Option<AccountType> {
    match bridge_type {
        "checking" => Some(AccountType::Checkings),
        "savings" => Some(AccountType::Savings),
        "brokerage" => Some(AccountType::Savings),
        "card" => Some(AccountType::CreditCard),
        "loan" => Some(AccountType::Loan),
        "shared_saving_plan" => Some(AccountType::Savings),
        "life_insurance" => Some(AccountType::Savings),
        _ => None,
    }
}

/// Bridge status code to Algoan account status
pub fn map_account_status(bridge_status: i32) -> AccountStatus {
    match bridge_status {
        BRIDGE_ACCOUNT_STATUS_OK => AccountStatus::Active,
        _ => AccountStatus::Error,
    }
}

pub fn map_usage(is_pro: bool) -> UsageType {
    if is_pro {
        UsageType::Professional
    } else {
        UsageType::Personal
    }
}

/// Bridge does not tell loan kinds apart, so every loan is `OTHER`
fn map_loan_details(loan: &BridgeLoanDetails) -> LoanDetailsDto {
    LoanDetailsDto {
        amount: loan.borrowed_capital,
        start_date: to_instant(loan.opening_date.as_deref()),
        end_date: to_instant(loan.maturity_date.as_deref()),
        payment: loan.next_payment_amount,
        interest_rate: loan.interest_rate,
        remaining_capital: loan.remaining_capital,
        loan_type: LoanType::Other,
    }
}
