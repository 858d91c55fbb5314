//! Field Mapper
//!
//! Pure translation of Bridge records into Algoan DTOs. The only remote
//! call is the resource-name lookup used for bank and category labels.

pub mod account;
pub mod date;
pub mod transaction;

pub use account::{map_account_status, map_account_type, map_bridge_accounts, map_usage};
pub use date::to_instant;
pub use transaction::map_bridge_transactions;
