//! Redemption workflow orchestration.
//!
//! This crate drives the purchase side of the redemption lifecycle as a
//! two-step workflow with compensation:
//! 1. Reserve stock (decrement by one)
//! 2. Charge the wallet
//!
//! If the charge fails, the reserved stock is returned before the error is
//! surfaced. The workflow instance itself is event-sourced, so every step and
//! compensation is persisted. Cancellations and status updates run the
//! reversal protocol: the transition is persisted first as durable intent,
//! then stock and wallet are restored, then the completion is recorded.

pub mod aggregate;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod purchase;
pub mod services;
pub mod state;

pub use aggregate::RedemptionWorkflow;
pub use error::RedemptionError;
pub use events::WorkflowEvent;
pub use orchestrator::RedemptionOrchestrator;
pub use services::{
    EventSink, InMemoryEventSink, InMemoryWallet, PaymentReceipt, RedemptionCreated, WalletService,
};
pub use state::WorkflowState;
