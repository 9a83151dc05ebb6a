//! Projection trait and position tracking for the ledger and catalog views.

use async_trait::async_trait;
use event_store::EventRecord;

use crate::Result;

/// How far into the global event log a view has read.
///
/// Positions are indexes into the store's insertion-ordered log, so a view
/// that is behind can be caught up by replaying only the tail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    /// Number of events processed by this projection.
    pub events_processed: u64,
}

impl ProjectionPosition {
    /// The position before any event has been read.
    pub fn zero() -> Self {
        Self {
            events_processed: 0,
        }
    }

    /// The position after one more event.
    pub fn advance(&self) -> Self {
        Self {
            events_processed: self.events_processed + 1,
        }
    }

    /// Whether the 1-based log index `event_index` has already been read.
    pub fn has_processed(&self, event_index: u64) -> bool {
        self.events_processed >= event_index
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.events_processed)
    }
}

/// A read-model view fed from the event log.
///
/// The ledger and catalog views implement this over every stored event;
/// events from foreign aggregate streams must still advance the position so
/// catch-up stays aligned with the global log.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Applies a single event to the view.
    async fn handle(&self, record: &EventRecord) -> Result<()>;

    /// Returns how far into the log this view has read.
    async fn position(&self) -> ProjectionPosition;

    /// Clears the view so it can be rebuilt from scratch.
    async fn reset(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_starts_at_zero() {
        assert_eq!(ProjectionPosition::zero().events_processed, 0);
    }

    #[test]
    fn position_advances_and_tracks_indexes() {
        let pos = ProjectionPosition::zero().advance().advance();
        assert_eq!(pos.events_processed, 2);
        assert!(pos.has_processed(1));
        assert!(pos.has_processed(2));
        assert!(!pos.has_processed(3));
    }

    #[test]
    fn position_display() {
        let pos = ProjectionPosition {
            events_processed: 42,
        };
        assert_eq!(pos.to_string(), "position(42)");
    }
}
