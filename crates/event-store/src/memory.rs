use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventQuery, EventRecord, EventStoreError, Result, Snapshot, Version,
    store::{AppendOptions, EventStore, EventStream, validate_append_batch},
};

#[derive(Default)]
struct Inner {
    /// Global log in insertion order.
    log: Vec<EventRecord>,
    /// Per-aggregate index into `log`.
    streams: HashMap<AggregateId, Vec<usize>>,
    snapshots: HashMap<AggregateId, Snapshot>,
}

impl Inner {
    fn stream_version(&self, aggregate_id: AggregateId) -> Version {
        self.streams
            .get(&aggregate_id)
            .and_then(|positions| positions.last())
            .map(|&pos| self.log[pos].version)
            .unwrap_or(Version::initial())
    }
}

/// In-memory event store used by tests and by the default API wiring.
///
/// Keeps a single insertion-ordered log plus a per-aggregate index, so stream
/// reads do not scan unrelated events.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored events.
    pub async fn event_count(&self) -> usize {
        self.inner.read().await.log.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventRecord>, options: AppendOptions) -> Result<Version> {
        validate_append_batch(&events)?;

        let aggregate_id = events[0].aggregate_id;
        let mut inner = self.inner.write().await;
        let current = inner.stream_version(aggregate_id);

        if let Some(expected) = options.expected_version
            && current != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current,
            });
        }

        // Mirrors the unique (aggregate_id, version) constraint in Postgres.
        if events[0].version <= current {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current),
                actual: current,
            });
        }

        let mut last = current;
        for event in events {
            last = event.version;
            let pos = inner.log.len();
            inner.streams.entry(aggregate_id).or_default().push(pos);
            inner.log.push(event);
        }

        Ok(last)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .streams
            .get(&aggregate_id)
            .map(|positions| positions.iter().map(|&pos| inner.log[pos].clone()).collect())
            .unwrap_or_default())
    }

    async fn get_events_for_aggregate_from_version(
        &self,
        aggregate_id: AggregateId,
        from_version: Version,
    ) -> Result<Vec<EventRecord>> {
        let events = self.get_events_for_aggregate(aggregate_id).await?;
        Ok(events
            .into_iter()
            .filter(|e| e.version >= from_version)
            .collect())
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventRecord>> {
        let inner = self.inner.read().await;
        let matching = inner.log.iter().filter(|e| {
            if let Some(id) = query.aggregate_id
                && e.aggregate_id != id
            {
                return false;
            }
            if let Some(ref agg_type) = query.aggregate_type
                && &e.aggregate_type != agg_type
            {
                return false;
            }
            if let Some(ref types) = query.event_types
                && !types.contains(&e.event_type)
            {
                return false;
            }
            if let Some(from) = query.from_version
                && e.version < from
            {
                return false;
            }
            if let Some(to) = query.to_version
                && e.version > to
            {
                return false;
            }
            true
        });

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matching.skip(offset).take(limit).cloned().collect())
    }

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .log
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect())
    }

    async fn stream_all_events(&self) -> Result<EventStream> {
        use futures_util::stream;

        let log = self.inner.read().await.log.clone();
        Ok(Box::pin(stream::iter(log.into_iter().map(Ok))))
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let inner = self.inner.read().await;
        let version = inner.stream_version(aggregate_id);
        Ok((version != Version::initial()).then_some(version))
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.snapshots.insert(snapshot.aggregate_id, snapshot);
        Ok(())
    }

    async fn get_snapshot(&self, aggregate_id: AggregateId) -> Result<Option<Snapshot>> {
        let inner = self.inner.read().await;
        Ok(inner.snapshots.get(&aggregate_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(aggregate_id: AggregateId, version: Version, event_type: &str) -> EventRecord {
        EventRecord::from_value(
            aggregate_id,
            "RedeemEntry",
            event_type,
            version,
            serde_json::json!({}),
        )
    }

    #[tokio::test]
    async fn append_and_read_back() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();

        let version = store
            .append(
                vec![record(id, Version::first(), "RedeemOpened")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        assert_eq!(version, Version::first());

        let events = store.get_events_for_aggregate(id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "RedeemOpened");
    }

    #[tokio::test]
    async fn stale_expected_version_conflicts() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();

        store
            .append(
                vec![record(id, Version::first(), "RedeemOpened")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        // Two writers both loaded version 1; the second append must lose.
        store
            .append(
                vec![record(id, Version::new(2), "StatusChanged")],
                AppendOptions::expect_version(Version::first()),
            )
            .await
            .unwrap();

        let result = store
            .append(
                vec![record(id, Version::new(2), "StatusChanged")],
                AppendOptions::expect_version(Version::first()),
            )
            .await;
        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn expect_new_conflicts_on_existing_stream() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();

        store
            .append(
                vec![record(id, Version::first(), "RedeemOpened")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let result = store
            .append(
                vec![record(id, Version::first(), "RedeemOpened")],
                AppendOptions::expect_new(),
            )
            .await;
        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn reads_from_version() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();

        store
            .append(
                vec![
                    record(id, Version::new(1), "RedeemOpened"),
                    record(id, Version::new(2), "StatusChanged"),
                    record(id, Version::new(3), "ReversalCompleted"),
                ],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let tail = store
            .get_events_for_aggregate_from_version(id, Version::new(2))
            .await
            .unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].version, Version::new(2));
    }

    #[tokio::test]
    async fn events_by_type_cross_streams() {
        let store = InMemoryEventStore::new();
        let a = AggregateId::new();
        let b = AggregateId::new();

        for (id, ty) in [(a, "RedeemOpened"), (b, "RedeemOpened")] {
            store
                .append(
                    vec![record(id, Version::first(), ty)],
                    AppendOptions::expect_new(),
                )
                .await
                .unwrap();
        }
        store
            .append(
                vec![record(a, Version::new(2), "StatusChanged")],
                AppendOptions::expect_version(Version::first()),
            )
            .await
            .unwrap();

        let opened = store.get_events_by_type("RedeemOpened").await.unwrap();
        assert_eq!(opened.len(), 2);
        let changed = store.get_events_by_type("StatusChanged").await.unwrap();
        assert_eq!(changed.len(), 1);
    }

    #[tokio::test]
    async fn query_respects_filters_and_paging() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();

        store
            .append(
                vec![
                    record(id, Version::new(1), "RedeemOpened"),
                    record(id, Version::new(2), "StatusChanged"),
                    record(id, Version::new(3), "StatusChanged"),
                ],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let results = store
            .query_events(
                EventQuery::for_aggregate(id)
                    .event_type("StatusChanged")
                    .offset(1)
                    .limit(5),
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].version, Version::new(3));
    }

    #[tokio::test]
    async fn stream_preserves_insertion_order() {
        use futures_util::StreamExt;

        let store = InMemoryEventStore::new();
        let a = AggregateId::new();
        let b = AggregateId::new();

        store
            .append(
                vec![record(a, Version::first(), "First")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        store
            .append(
                vec![record(b, Version::first(), "Second")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let events: Vec<_> = store
            .stream_all_events()
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap().event_type, "First");
        assert_eq!(events[1].as_ref().unwrap().event_type, "Second");
    }

    #[tokio::test]
    async fn snapshot_roundtrip_and_absence() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();

        assert!(store.get_snapshot(id).await.unwrap().is_none());

        let snapshot =
            Snapshot::from_state(id, "Product", Version::new(4), &serde_json::json!({"stock": 3}))
                .unwrap();
        store.save_snapshot(snapshot).await.unwrap();

        let loaded = store.get_snapshot(id).await.unwrap().unwrap();
        assert_eq!(loaded.version, Version::new(4));
    }

    #[tokio::test]
    async fn version_tracking() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();

        assert!(store.get_aggregate_version(id).await.unwrap().is_none());

        store
            .append(
                vec![
                    record(id, Version::new(1), "RedeemOpened"),
                    record(id, Version::new(2), "StatusChanged"),
                ],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        assert_eq!(
            store.get_aggregate_version(id).await.unwrap(),
            Some(Version::new(2))
        );
    }
}
