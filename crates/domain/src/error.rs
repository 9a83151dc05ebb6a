//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::product::ProductError;
use crate::redeem::RedeemError;
use crate::shop::ShopError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Catalog rule violation.
    #[error("Product error: {0}")]
    Product(ProductError),

    /// Shop listing rule violation.
    #[error("Shop error: {0}")]
    Shop(ShopError),

    /// Redemption ledger rule violation.
    #[error("Redeem error: {0}")]
    Redeem(RedeemError),

    /// Aggregate not found.
    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
