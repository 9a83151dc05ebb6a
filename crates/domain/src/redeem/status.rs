//! Redemption ledger status and its transition rules.

use serde::{Deserialize, Serialize};

/// Approval lifecycle of a ledger entry.
///
/// `WaitingApproval` is the only non-terminal status. Once an entry reaches
/// `Redeemed`, `Canceled` or `Declined` no further transition is allowed,
/// which guarantees at most one stock-and-wallet reversal per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedeemStatus {
    /// Purchase went through; a human has not yet approved the hand-over.
    #[default]
    WaitingApproval,

    /// Approved and handed over.
    Redeemed,

    /// Withdrawn by the user before approval.
    Canceled,

    /// Rejected by an operator.
    Declined,
}

impl RedeemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedeemStatus::WaitingApproval => "WAITING_APPROVAL",
            RedeemStatus::Redeemed => "REDEEMED",
            RedeemStatus::Canceled => "CANCELED",
            RedeemStatus::Declined => "DECLINED",
        }
    }

    /// Whether the entry can move from `self` to `to`.
    pub fn can_transition_to(&self, to: RedeemStatus) -> bool {
        matches!(
            (self, to),
            (
                RedeemStatus::WaitingApproval,
                RedeemStatus::Redeemed | RedeemStatus::Canceled | RedeemStatus::Declined,
            )
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RedeemStatus::WaitingApproval)
    }

    /// Whether landing in this status returns stock and refunds the wallet.
    pub fn requires_reversal(&self) -> bool {
        matches!(self, RedeemStatus::Canceled | RedeemStatus::Declined)
    }
}

impl std::fmt::Display for RedeemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RedeemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING_APPROVAL" => Ok(RedeemStatus::WaitingApproval),
            "REDEEMED" => Ok(RedeemStatus::Redeemed),
            "CANCELED" => Ok(RedeemStatus::Canceled),
            "DECLINED" => Ok(RedeemStatus::Declined),
            other => Err(format!("unknown redemption status: {other}")),
        }
    }
}
