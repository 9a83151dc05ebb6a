//! Ledger read model — denormalized redemption entries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{Money, RedeemEvent, RedeemStatus, UserId};
use event_store::EventRecord;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;

/// A denormalized ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntrySummary {
    pub redeem_id: AggregateId,
    pub shop_id: AggregateId,
    pub user_id: UserId,
    pub product_id: AggregateId,
    pub price: Money,
    pub status: RedeemStatus,
    pub reversal_pending: bool,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

struct LedgerState {
    entries: HashMap<AggregateId, LedgerEntrySummary>,
    position: ProjectionPosition,
}

/// Read model view over the redemption ledger.
///
/// Entries are never removed; cancellations and declines only change status.
#[derive(Clone)]
pub struct LedgerView {
    state: Arc<RwLock<LedgerState>>,
}

impl LedgerView {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState {
                entries: HashMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// Gets a single entry.
    pub async fn get(&self, redeem_id: AggregateId) -> Option<LedgerEntrySummary> {
        self.state.read().await.entries.get(&redeem_id).cloned()
    }

    /// All entries, newest first.
    pub async fn all(&self) -> Vec<LedgerEntrySummary> {
        let state = self.state.read().await;
        let mut entries: Vec<_> = state.entries.values().cloned().collect();
        entries.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        entries
    }

    /// Entries opened by `user_id`, newest first.
    pub async fn for_user(&self, user_id: UserId) -> Vec<LedgerEntrySummary> {
        let mut entries: Vec<_> = self
            .state
            .read()
            .await
            .entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        entries
    }

    /// Entries currently in `status`, newest first.
    pub async fn with_status(&self, status: RedeemStatus) -> Vec<LedgerEntrySummary> {
        let mut entries: Vec<_> = self
            .state
            .read()
            .await
            .entries
            .values()
            .filter(|e| e.status == status)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        entries
    }
}

impl Default for LedgerView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for LedgerView {
    fn name(&self) -> &'static str {
        "LedgerView"
    }

    async fn handle(&self, record: &EventRecord) -> Result<()> {
        let mut state = self.state.write().await;

        if record.aggregate_type != "RedeemEntry" {
            state.position = state.position.advance();
            return Ok(());
        }

        let event: RedeemEvent = record.payload_as()?;
        let redeem_id = record.aggregate_id;

        match event {
            RedeemEvent::RedeemOpened(data) => {
                state.entries.insert(
                    redeem_id,
                    LedgerEntrySummary {
                        redeem_id,
                        shop_id: data.shop_id,
                        user_id: data.user_id,
                        product_id: data.product_id,
                        price: data.price,
                        status: RedeemStatus::WaitingApproval,
                        reversal_pending: false,
                        opened_at: data.opened_at,
                        updated_at: data.opened_at,
                    },
                );
            }
            RedeemEvent::StatusChanged(data) => {
                if let Some(entry) = state.entries.get_mut(&redeem_id) {
                    entry.status = data.to;
                    if data.to.requires_reversal() {
                        entry.reversal_pending = true;
                    }
                    entry.updated_at = data.changed_at;
                }
            }
            RedeemEvent::ReversalCompleted(data) => {
                if let Some(entry) = state.entries.get_mut(&redeem_id) {
                    entry.reversal_pending = false;
                    entry.updated_at = data.completed_at;
                }
            }
        }

        state.position = state.position.advance();
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.position = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for LedgerView {
    fn name(&self) -> &'static str {
        "LedgerView"
    }

    fn count(&self) -> usize {
        self.state.try_read().map(|s| s.entries.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainEvent;
    use event_store::Version;

    fn make_record(redeem_id: AggregateId, version: i64, event: &RedeemEvent) -> EventRecord {
        EventRecord::new(
            redeem_id,
            "RedeemEntry",
            event.event_type(),
            Version::new(version),
            event,
        )
        .unwrap()
    }

    async fn open_entry(view: &LedgerView, user_id: UserId) -> AggregateId {
        let redeem_id = AggregateId::new();
        let event = RedeemEvent::redeem_opened(
            redeem_id,
            AggregateId::new(),
            user_id,
            AggregateId::new(),
            Money::from_units(500),
        );
        view.handle(&make_record(redeem_id, 1, &event)).await.unwrap();
        redeem_id
    }

    #[tokio::test]
    async fn opened_entry_appears() {
        let view = LedgerView::new();
        let user_id = UserId::new();
        let redeem_id = open_entry(&view, user_id).await;

        let entry = view.get(redeem_id).await.unwrap();
        assert_eq!(entry.status, RedeemStatus::WaitingApproval);
        assert_eq!(entry.user_id, user_id);
        assert_eq!(entry.price, Money::from_units(500));
    }

    #[tokio::test]
    async fn status_and_reversal_tracking() {
        let view = LedgerView::new();
        let redeem_id = open_entry(&view, UserId::new()).await;

        let event =
            RedeemEvent::status_changed(RedeemStatus::WaitingApproval, RedeemStatus::Canceled);
        view.handle(&make_record(redeem_id, 2, &event)).await.unwrap();

        let entry = view.get(redeem_id).await.unwrap();
        assert_eq!(entry.status, RedeemStatus::Canceled);
        assert!(entry.reversal_pending);

        let event = RedeemEvent::reversal_completed();
        view.handle(&make_record(redeem_id, 3, &event)).await.unwrap();

        let entry = view.get(redeem_id).await.unwrap();
        assert!(!entry.reversal_pending);
    }

    #[tokio::test]
    async fn filters_by_user_and_status() {
        let view = LedgerView::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let a1 = open_entry(&view, alice).await;
        open_entry(&view, alice).await;
        open_entry(&view, bob).await;

        let event =
            RedeemEvent::status_changed(RedeemStatus::WaitingApproval, RedeemStatus::Redeemed);
        view.handle(&make_record(a1, 2, &event)).await.unwrap();

        assert_eq!(view.all().await.len(), 3);
        assert_eq!(view.for_user(alice).await.len(), 2);
        assert_eq!(view.for_user(bob).await.len(), 1);
        assert_eq!(view.with_status(RedeemStatus::Redeemed).await.len(), 1);
        assert_eq!(
            view.with_status(RedeemStatus::WaitingApproval).await.len(),
            2
        );
    }

    #[tokio::test]
    async fn ignores_foreign_aggregates() {
        let view = LedgerView::new();
        let record = EventRecord::from_value(
            AggregateId::new(),
            "Product",
            "ProductAdded",
            Version::new(1),
            serde_json::json!({}),
        );
        view.handle(&record).await.unwrap();

        assert!(view.all().await.is_empty());
        assert_eq!(view.position().await.events_processed, 1);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let view = LedgerView::new();
        open_entry(&view, UserId::new()).await;

        view.reset().await.unwrap();
        assert!(view.all().await.is_empty());
        assert_eq!(view.position().await.events_processed, 0);
    }
}
