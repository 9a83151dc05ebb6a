//! Redemption ledger domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::{Money, UserId};

use super::RedeemStatus;

/// Events that can occur on a ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RedeemEvent {
    /// A purchase went through and the entry was opened in `WaitingApproval`.
    RedeemOpened(RedeemOpenedData),

    /// The entry moved to a new status.
    StatusChanged(StatusChangedData),

    /// Stock was returned and the wallet refunded after a move into
    /// `Canceled` or `Declined`.
    ReversalCompleted(ReversalCompletedData),
}

impl DomainEvent for RedeemEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RedeemEvent::RedeemOpened(_) => "RedeemOpened",
            RedeemEvent::StatusChanged(_) => "RedeemStatusChanged",
            RedeemEvent::ReversalCompleted(_) => "RedeemReversalCompleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemOpenedData {
    pub redeem_id: AggregateId,
    pub shop_id: AggregateId,
    pub user_id: UserId,
    pub product_id: AggregateId,
    pub price: Money,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangedData {
    pub from: RedeemStatus,
    pub to: RedeemStatus,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReversalCompletedData {
    pub completed_at: DateTime<Utc>,
}

impl RedeemEvent {
    pub fn redeem_opened(
        redeem_id: AggregateId,
        shop_id: AggregateId,
        user_id: UserId,
        product_id: AggregateId,
        price: Money,
    ) -> Self {
        RedeemEvent::RedeemOpened(RedeemOpenedData {
            redeem_id,
            shop_id,
            user_id,
            product_id,
            price,
            opened_at: Utc::now(),
        })
    }

    pub fn status_changed(from: RedeemStatus, to: RedeemStatus) -> Self {
        RedeemEvent::StatusChanged(StatusChangedData {
            from,
            to,
            changed_at: Utc::now(),
        })
    }

    pub fn reversal_completed() -> Self {
        RedeemEvent::ReversalCompleted(ReversalCompletedData {
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_changed_round_trips() {
        let event =
            RedeemEvent::status_changed(RedeemStatus::WaitingApproval, RedeemStatus::Canceled);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StatusChanged");
        assert_eq!(json["data"]["from"], "WAITING_APPROVAL");
        assert_eq!(json["data"]["to"], "CANCELED");

        let back: RedeemEvent = serde_json::from_value(json).unwrap();
        assert!(matches!(back, RedeemEvent::StatusChanged(_)));
    }

    #[test]
    fn event_types_are_prefixed() {
        let event = RedeemEvent::reversal_completed();
        assert_eq!(event.event_type(), "RedeemReversalCompleted");
    }
}
