//! Transaction mapping
//!
//! Bridge transactions to Algoan transaction DTOs.

use futures::future::try_join_all;

use super::date::to_instant;
use crate::clients::{Aggregator, ClientError};
use crate::domain::{BridgeTransaction, ClientConfig, TransactionDto, TransactionType};

/// Map a batch of Bridge transactions, resolving category names concurrently.
///
/// Output order equals input order whatever order the lookups complete in.
pub async fn map_bridge_transactions(
    transactions: &[BridgeTransaction],
    access_token: &str,
    aggregator: &dyn Aggregator,
    config: &ClientConfig,
) -> Result<Vec<TransactionDto>, ClientError> {
    try_join_all(
        transactions
            .iter()
            .map(|transaction| map_bridge_transaction(transaction, access_token, aggregator, config)),
    )
    .await
}

async fn map_bridge_transaction(
    transaction: &BridgeTransaction,
    access_token: &str,
    aggregator: &dyn Aggregator,
    config: &ClientConfig,
) -> Result<TransactionDto, ClientError> {
    let category = aggregator
        .get_resource_name(access_token, &transaction.category.resource_uri, config)
        .await?;

    Ok(TransactionDto {
        amount: transaction.amount,
        simplified_description: transaction.description.clone(),
        description: transaction.raw_description.clone(),
        // Bridge does not expose the card used
        banks_user_card_id: None,
        reference: transaction.id.to_string(),
        user_description: transaction.description.clone(),
        category,
        transaction_type: TransactionType::Unknown,
        date: to_instant(Some(transaction.date.as_str())),
    })
}
