//! Collaborator traits and in-memory implementations.

pub mod notifier;
pub mod wallet;

pub use notifier::{EventSink, InMemoryEventSink, RedemptionCreated};
pub use wallet::{InMemoryWallet, PaymentReceipt, WalletService};
