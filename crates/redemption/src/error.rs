//! Orchestrator error types.

use common::AggregateId;
use domain::{DomainError, ProductError, RedeemError};
use event_store::EventStoreError;
use thiserror::Error;

/// Errors that can occur during redemption orchestration.
#[derive(Debug, Error)]
pub enum RedemptionError {
    /// No active shop listing with this id.
    #[error("Shop listing not found: {0}")]
    ShopNotFound(AggregateId),

    /// The listed product does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(AggregateId),

    /// No ledger entry with this id.
    #[error("Redemption entry not found: {0}")]
    EntryNotFound(AggregateId),

    /// Product is unavailable or out of stock; nothing was mutated.
    #[error("Product is not available for redemption: {0}")]
    ProductUnavailable(AggregateId),

    /// Wallet charge failed; reserved stock was already returned.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// The entry's current status does not permit the requested transition.
    #[error("Invalid status transition: {reason}")]
    InvalidState { reason: String },

    /// The entry already reached `Redeemed`.
    #[error("Redemption already completed")]
    AlreadyCompleted,

    /// A malformed value at the boundary, e.g. an unknown status string.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The downstream event sink rejected or dropped a notification.
    #[error("Event sink error: {0}")]
    Sink(String),

    /// Stock or wallet reversal failed after the transition was persisted.
    ///
    /// The entry stays flagged for recovery; this is a fatal inconsistency
    /// that must never be swallowed.
    #[error("Reversal failed for entry {redeem_id}: {reason}")]
    ReversalFailed {
        redeem_id: AggregateId,
        reason: String,
    },

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(DomainError),

    /// Event store error.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DomainError> for RedemptionError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Redeem(RedeemError::AlreadyCompleted) => RedemptionError::AlreadyCompleted,
            DomainError::Redeem(RedeemError::InvalidTransition { from, to }) => {
                RedemptionError::InvalidState {
                    reason: format!("{from} -> {to}"),
                }
            }
            DomainError::EventStore(e) => RedemptionError::EventStore(e),
            other => RedemptionError::Domain(other),
        }
    }
}

impl RedemptionError {
    /// Maps a stock reservation failure to the caller-facing error.
    pub(crate) fn from_reserve_failure(product_id: AggregateId, e: DomainError) -> Self {
        match e {
            DomainError::Product(ProductError::OutOfStock { .. }) => {
                RedemptionError::ProductUnavailable(product_id)
            }
            other => other.into(),
        }
    }
}

/// Convenience type alias for orchestrator results.
pub type Result<T> = std::result::Result<T, RedemptionError>;
