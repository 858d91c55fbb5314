//! Domain module
//!
//! Wire types for both platforms and the webhook event model.

pub mod algoan;
pub mod bridge;
pub mod error;
pub mod event;
pub mod service_account;

pub use algoan::{
    AccountDto, AccountStatus, AccountType, BanksUser, BanksUserStatus, BanksUserUpdate,
    CreatedAccount, LoanDetailsDto, LoanType, TransactionDto, TransactionType, UsageType,
};
pub use bridge::{
    AuthenticationResponse, BridgeAccount, BridgeLoanDetails, BridgeTransaction, ClientConfig,
    ResourceLink,
};
pub use error::DomainError;
pub use event::{BankreaderLinkRequiredPayload, BankreaderRequiredPayload, EventDto, EventName};
pub use service_account::{ServiceAccount, Subscription};
