//! Aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// A fact that has happened in the domain, named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Stable type tag used for persistence and event store filtering.
    fn event_type(&self) -> &'static str;
}

/// An event-sourced entity.
///
/// Aggregates are rebuilt by replaying their event stream. Command methods
/// validate against the current state and return events; `apply` folds an
/// event into the state and must be pure and infallible.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// Event type produced and consumed by this aggregate.
    type Event: DomainEvent;

    /// Error type for rejected commands.
    type Error: std::error::Error + Send + Sync;

    /// Aggregate kind tag used for event store organization.
    fn aggregate_type() -> &'static str;

    /// The aggregate's id, or `None` before the first event.
    fn id(&self) -> Option<AggregateId>;

    /// Current stream version.
    fn version(&self) -> Version;

    /// Sets the stream version after replay or append.
    fn set_version(&mut self, version: Version);

    /// Folds an event into the state.
    fn apply(&mut self, event: Self::Event);

    /// Folds a sequence of events into the state.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

/// Aggregates whose state can be snapshotted to shorten replays.
pub trait SnapshotCapable: Aggregate + Serialize + DeserializeOwned {
    /// Number of events between snapshots.
    fn snapshot_interval() -> usize {
        100
    }

    /// Whether a snapshot is due at the current version.
    fn should_snapshot(&self) -> bool {
        self.version().as_i64() > 0
            && (self.version().as_i64() as usize).is_multiple_of(Self::snapshot_interval())
    }
}
