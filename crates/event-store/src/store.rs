use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{AggregateId, EventQuery, EventRecord, EventStoreError, Result, Snapshot, Version};

/// Options controlling an append.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected current version of the stream. `None` skips the check, which
    /// is only appropriate for replays and test fixtures.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// No version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the stream to currently be at `version`.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Require the stream to not exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// A stream of stored events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventRecord>> + Send>>;

/// Persistence contract for event streams.
///
/// Implementations must be thread-safe; appends for a single aggregate are
/// serialized by the version check rather than by locking in callers.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch of events atomically.
    ///
    /// When `options.expected_version` is set and does not match the current
    /// stream version, fails with [`EventStoreError::ConcurrencyConflict`]
    /// and writes nothing. Returns the stream version after the append.
    async fn append(&self, events: Vec<EventRecord>, options: AppendOptions) -> Result<Version>;

    /// All events of one aggregate, in version order.
    async fn get_events_for_aggregate(&self, aggregate_id: AggregateId)
    -> Result<Vec<EventRecord>>;

    /// Events of one aggregate starting at `from_version` (inclusive), used
    /// when replaying on top of a snapshot.
    async fn get_events_for_aggregate_from_version(
        &self,
        aggregate_id: AggregateId,
        from_version: Version,
    ) -> Result<Vec<EventRecord>>;

    /// Events matching a filter, in global order.
    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventRecord>>;

    /// All events of one type, in global order.
    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventRecord>>;

    /// Streams every stored event in insertion order.
    async fn stream_all_events(&self) -> Result<EventStream>;

    /// Current version of a stream, or `None` if it has no events.
    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;

    /// Saves a snapshot, replacing any previous one for the aggregate.
    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()>;

    /// Latest snapshot for an aggregate, if any.
    async fn get_snapshot(&self, aggregate_id: AggregateId) -> Result<Option<Snapshot>>;
}

/// Convenience helpers shared by every store implementation.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Appends a single event.
    async fn append_event(&self, event: EventRecord, options: AppendOptions) -> Result<Version> {
        self.append(vec![event], options).await
    }

    /// Whether the aggregate has any events.
    async fn aggregate_exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.get_aggregate_version(aggregate_id).await?.is_some())
    }

    /// Loads the snapshot (if any) plus the events recorded after it.
    async fn load_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<(Option<Snapshot>, Vec<EventRecord>)> {
        if let Some(snapshot) = self.get_snapshot(aggregate_id).await? {
            let events = self
                .get_events_for_aggregate_from_version(aggregate_id, snapshot.version.next())
                .await?;
            Ok((Some(snapshot), events))
        } else {
            let events = self.get_events_for_aggregate(aggregate_id).await?;
            Ok((None, events))
        }
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Checks that an append batch is non-empty, targets a single stream and
/// carries consecutive versions.
pub(crate) fn validate_append_batch(events: &[EventRecord]) -> Result<()> {
    let first = events
        .first()
        .ok_or_else(|| EventStoreError::InvalidAppend("empty event batch".to_string()))?;

    let mut expected = first.version;
    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::InvalidAppend(
                "batch spans multiple aggregates".to_string(),
            ));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::InvalidAppend(
                "batch mixes aggregate types".to_string(),
            ));
        }
        expected = expected.next();
        if event.version != expected {
            return Err(EventStoreError::InvalidAppend(format!(
                "non-sequential versions: expected {expected}, got {}",
                event.version
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(aggregate_id: AggregateId, version: Version) -> EventRecord {
        EventRecord::from_value(
            aggregate_id,
            "Product",
            "StockDecremented",
            version,
            serde_json::json!({"quantity": 1}),
        )
    }

    #[test]
    fn empty_batch_rejected() {
        assert!(matches!(
            validate_append_batch(&[]),
            Err(EventStoreError::InvalidAppend(_))
        ));
    }

    #[test]
    fn mixed_aggregates_rejected() {
        let batch = vec![
            record(AggregateId::new(), Version::first()),
            record(AggregateId::new(), Version::new(2)),
        ];
        assert!(matches!(
            validate_append_batch(&batch),
            Err(EventStoreError::InvalidAppend(_))
        ));
    }

    #[test]
    fn version_gap_rejected() {
        let id = AggregateId::new();
        let batch = vec![record(id, Version::first()), record(id, Version::new(3))];
        assert!(matches!(
            validate_append_batch(&batch),
            Err(EventStoreError::InvalidAppend(_))
        ));
    }

    #[test]
    fn sequential_batch_accepted() {
        let id = AggregateId::new();
        let batch = vec![
            record(id, Version::first()),
            record(id, Version::new(2)),
            record(id, Version::new(3)),
        ];
        assert!(validate_append_batch(&batch).is_ok());
    }
}
