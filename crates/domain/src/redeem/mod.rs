//! Redemption ledger aggregate and related types.

mod aggregate;
mod events;
mod service;
mod status;

pub use aggregate::RedeemEntry;
pub use events::{RedeemEvent, RedeemOpenedData, ReversalCompletedData, StatusChangedData};
pub use service::RedeemService;
pub use status::RedeemStatus;

use thiserror::Error;

/// Errors that can occur on the redemption ledger.
#[derive(Debug, Error)]
pub enum RedeemError {
    /// The entry already exists.
    #[error("Redemption entry already opened")]
    AlreadyOpened,

    /// The entry reached `Redeemed`; nothing more can happen to it.
    #[error("Redemption already completed")]
    AlreadyCompleted,

    /// The transition is not allowed from the current status.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: RedeemStatus, to: RedeemStatus },

    /// Reversal bookkeeping called without a pending reversal.
    #[error("No reversal is pending for this entry")]
    NoReversalPending,
}
