//! Algoan Bridge Connector Library
//!
//! Re-exports modules for integration testing and for the binary.

pub mod api;
pub mod clients;
pub mod config;
pub mod domain;
pub mod handlers;
pub mod mapping;
pub mod registry;

mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{DomainError, EventDto, EventName, ServiceAccount, Subscription};
pub use handlers::WebhookHandler;
pub use registry::{InMemoryRegistry, ServiceAccountRegistry};
