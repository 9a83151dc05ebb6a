//! Catch-up processor feeding the event log into the registered views.

use event_store::{EventRecord, EventStore};
use futures_util::StreamExt;
use tokio::sync::Mutex;

use crate::Result;
use crate::projection::Projection;

/// Replays the store's global log into the ledger and catalog views.
///
/// Query handlers share one processor and call [`run_catch_up`] before
/// reading a view, so catch-up runs are serialized internally: without that,
/// two overlapping runs would deliver the same event twice and advance a
/// view's position past events it never handled.
///
/// [`run_catch_up`]: ProjectionProcessor::run_catch_up
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Box<dyn Projection>>,
    catch_up: Mutex<()>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            catch_up: Mutex::new(()),
        }
    }

    /// Registers a view with this processor.
    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
    }

    /// Returns the number of registered views.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Streams the whole log and delivers each event to every view that has
    /// not seen it yet. Only one catch-up runs at a time; concurrent callers
    /// wait and then observe an already-caught-up log.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<()> {
        let _running = self.catch_up.lock().await;

        let mut stream = self.store.stream_all_events().await?;
        let mut event_index: u64 = 0;

        while let Some(result) = stream.next().await {
            let record = result?;
            event_index += 1;

            for projection in &self.projections {
                if !projection.position().await.has_processed(event_index) {
                    projection.handle(&record).await?;
                    metrics::counter!("projections_events_processed").increment(1);
                }
            }
        }

        tracing::debug!(events_processed = event_index, "catch-up complete");

        Ok(())
    }

    /// Delivers a single freshly appended event to all views.
    #[tracing::instrument(skip(self, record), fields(event_type = %record.event_type))]
    pub async fn process_event(&self, record: &EventRecord) -> Result<()> {
        for projection in &self.projections {
            projection.handle(record).await?;
        }
        Ok(())
    }

    /// Clears every view and replays the log from the beginning.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<()> {
        let _running = self.catch_up.lock().await;

        for projection in &self.projections {
            projection.reset().await?;
        }
        drop(_running);
        self.run_catch_up().await
    }
}
