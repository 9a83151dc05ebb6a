//! Projection error types.

use thiserror::Error;

/// Errors that can occur while feeding events into read models.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The underlying event store failed.
    #[error("Event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// An event payload did not match the shape the view expects.
    #[error("Event deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
