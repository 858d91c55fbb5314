//! Event handlers
//!
//! The webhook dispatcher and the two event handlers it routes to.
//! Handlers only see the collaborator traits, never HTTP types.

mod bank_reader_handler;
mod link_required;
mod webhook_handler;

#[cfg(test)]
mod tests;

pub use bank_reader_handler::BankReaderHandler;
pub use link_required::LinkRequiredHandler;
pub use webhook_handler::WebhookHandler;
