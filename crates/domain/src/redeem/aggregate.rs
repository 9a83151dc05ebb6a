//! Redemption ledger aggregate implementation.

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, SnapshotCapable};
use crate::value_objects::{Money, UserId};

use super::{RedeemError, RedeemEvent, RedeemStatus};

/// A ledger entry tracking one redemption from purchase to hand-over.
///
/// Entries are never deleted. A move into `Canceled` or `Declined` marks the
/// entry `reversal_pending` until the stock-and-wallet reversal is recorded,
/// so an interrupted reversal can be found and resumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedeemEntry {
    id: Option<AggregateId>,

    #[serde(default)]
    version: Version,

    shop_id: Option<AggregateId>,
    user_id: Option<UserId>,
    product_id: Option<AggregateId>,
    price: Money,
    status: RedeemStatus,
    reversal_pending: bool,
    opened_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Aggregate for RedeemEntry {
    type Event = RedeemEvent;
    type Error = RedeemError;

    fn aggregate_type() -> &'static str {
        "RedeemEntry"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            RedeemEvent::RedeemOpened(data) => {
                self.id = Some(data.redeem_id);
                self.shop_id = Some(data.shop_id);
                self.user_id = Some(data.user_id);
                self.product_id = Some(data.product_id);
                self.price = data.price;
                self.status = RedeemStatus::WaitingApproval;
                self.opened_at = Some(data.opened_at);
                self.updated_at = Some(data.opened_at);
            }
            RedeemEvent::StatusChanged(data) => {
                self.status = data.to;
                if data.to.requires_reversal() {
                    self.reversal_pending = true;
                }
                self.updated_at = Some(data.changed_at);
            }
            RedeemEvent::ReversalCompleted(data) => {
                self.reversal_pending = false;
                self.updated_at = Some(data.completed_at);
            }
        }
    }
}

impl SnapshotCapable for RedeemEntry {
    fn snapshot_interval() -> usize {
        50
    }
}

impl RedeemEntry {
    pub fn shop_id(&self) -> Option<AggregateId> {
        self.shop_id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn product_id(&self) -> Option<AggregateId> {
        self.product_id
    }

    /// Price paid at purchase time; the amount a reversal refunds.
    pub fn price(&self) -> Money {
        self.price
    }

    pub fn status(&self) -> RedeemStatus {
        self.status
    }

    /// Whether the entry sits in a reversal status with side effects still
    /// outstanding.
    pub fn reversal_pending(&self) -> bool {
        self.reversal_pending
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Opens the entry in `WaitingApproval` after a successful purchase.
    pub fn open(
        &self,
        redeem_id: AggregateId,
        shop_id: AggregateId,
        user_id: UserId,
        product_id: AggregateId,
        price: Money,
    ) -> Result<Vec<RedeemEvent>, RedeemError> {
        if self.id.is_some() {
            return Err(RedeemError::AlreadyOpened);
        }

        Ok(vec![RedeemEvent::redeem_opened(
            redeem_id, shop_id, user_id, product_id, price,
        )])
    }

    /// Moves the entry to `to`, enforcing the transition rules.
    pub fn change_status(&self, to: RedeemStatus) -> Result<Vec<RedeemEvent>, RedeemError> {
        if self.status == RedeemStatus::Redeemed {
            return Err(RedeemError::AlreadyCompleted);
        }
        if !self.status.can_transition_to(to) {
            return Err(RedeemError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        Ok(vec![RedeemEvent::status_changed(self.status, to)])
    }

    /// Records that stock was returned and the wallet refunded.
    pub fn mark_reversal_completed(&self) -> Result<Vec<RedeemEvent>, RedeemError> {
        if !self.reversal_pending {
            return Err(RedeemError::NoReversalPending);
        }

        Ok(vec![RedeemEvent::reversal_completed()])
    }
}
