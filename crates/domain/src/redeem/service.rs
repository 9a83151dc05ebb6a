//! Ledger service wrapping the redemption command handler.

use common::AggregateId;
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::value_objects::{Money, UserId};

use super::{RedeemEntry, RedeemStatus};

impl From<super::RedeemError> for DomainError {
    fn from(e: super::RedeemError) -> Self {
        DomainError::Redeem(e)
    }
}

/// High-level ledger operations.
pub struct RedeemService<S: EventStore> {
    handler: CommandHandler<S, RedeemEntry>,
}

impl<S: EventStore> RedeemService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub fn handler(&self) -> &CommandHandler<S, RedeemEntry> {
        &self.handler
    }

    /// Opens a new entry in `WaitingApproval`.
    #[tracing::instrument(skip(self))]
    pub async fn open_entry(
        &self,
        redeem_id: AggregateId,
        shop_id: AggregateId,
        user_id: UserId,
        product_id: AggregateId,
        price: Money,
    ) -> Result<CommandResult<RedeemEntry>, DomainError> {
        self.handler
            .execute(redeem_id, |entry| {
                entry.open(redeem_id, shop_id, user_id, product_id, price)
            })
            .await
    }

    /// Moves an entry to `to` under the ledger's transition rules.
    ///
    /// The append carries the loaded version, so two concurrent transitions
    /// out of `WaitingApproval` resolve to one winner; the loser surfaces a
    /// concurrency conflict instead of a second reversal.
    #[tracing::instrument(skip(self))]
    pub async fn change_status(
        &self,
        redeem_id: AggregateId,
        to: RedeemStatus,
    ) -> Result<CommandResult<RedeemEntry>, DomainError> {
        self.handler
            .execute_with_snapshot(redeem_id, |entry| entry.change_status(to))
            .await
    }

    /// Records that the stock-and-wallet reversal for an entry finished.
    #[tracing::instrument(skip(self))]
    pub async fn complete_reversal(
        &self,
        redeem_id: AggregateId,
    ) -> Result<CommandResult<RedeemEntry>, DomainError> {
        self.handler
            .execute_with_snapshot(redeem_id, |entry| entry.mark_reversal_completed())
            .await
    }

    /// Loads an entry, or `None` when it has never existed.
    #[tracing::instrument(skip(self))]
    pub async fn get_entry(
        &self,
        redeem_id: AggregateId,
    ) -> Result<Option<RedeemEntry>, DomainError> {
        self.handler.load_existing(redeem_id).await
    }

    /// Entries sitting in a reversal status whose side effects never landed.
    ///
    /// Scans the status-change history and reloads each candidate, so a crash
    /// between the recorded transition and the reversal leaves a recoverable
    /// trail.
    #[tracing::instrument(skip(self))]
    pub async fn entries_with_pending_reversal(
        &self,
    ) -> Result<Vec<RedeemEntry>, DomainError> {
        let changes = self
            .handler
            .store()
            .get_events_by_type("RedeemStatusChanged")
            .await?;

        let mut seen = std::collections::HashSet::new();
        let mut pending = Vec::new();
        for record in changes {
            if !seen.insert(record.aggregate_id) {
                continue;
            }
            if let Some(entry) = self.get_entry(record.aggregate_id).await?
                && entry.reversal_pending()
            {
                pending.push(entry);
            }
        }

        Ok(pending)
    }
}
