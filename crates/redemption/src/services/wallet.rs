//! Wallet service trait and in-memory implementation.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::AggregateId;
use domain::{Money, UserId};

use crate::error::RedemptionError;

/// Result of a successful wallet charge.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// The charge id assigned by the wallet.
    pub charge_id: String,
}

/// Trait for wallet payment operations.
///
/// `pay` has no partial-success state: it either charges the full amount or
/// fails. `refund` must be safe to retry; the reversal recovery path may call
/// it again for a charge that was already refunded.
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Charges a user for a product.
    async fn pay(
        &self,
        user_id: UserId,
        product_id: AggregateId,
        amount: Money,
    ) -> Result<PaymentReceipt, RedemptionError>;

    /// Refunds a previous charge for a product.
    async fn refund(
        &self,
        user_id: UserId,
        product_id: AggregateId,
        amount: Money,
    ) -> Result<(), RedemptionError>;
}

#[derive(Debug, Default)]
struct InMemoryWalletState {
    /// Outstanding charges keyed by (user, product, charge id).
    charges: HashSet<(UserId, AggregateId, String)>,
    next_id: u32,
    pay_count: u32,
    refund_count: u32,
    fail_on_pay: bool,
    fail_on_refund: bool,
}

/// In-memory wallet for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWallet {
    state: Arc<RwLock<InMemoryWalletState>>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the wallet to fail the next pay calls.
    pub fn set_fail_on_pay(&self, fail: bool) {
        self.state.write().unwrap().fail_on_pay = fail;
    }

    /// Configures the wallet to fail the next refund calls.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().unwrap().fail_on_refund = fail;
    }

    /// Number of charges that have not been refunded.
    pub fn outstanding_charges(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// Total successful pay calls.
    pub fn pay_count(&self) -> u32 {
        self.state.read().unwrap().pay_count
    }

    /// Total refund calls, including no-op retries.
    pub fn refund_count(&self) -> u32 {
        self.state.read().unwrap().refund_count
    }
}

#[async_trait]
impl WalletService for InMemoryWallet {
    async fn pay(
        &self,
        user_id: UserId,
        product_id: AggregateId,
        amount: Money,
    ) -> Result<PaymentReceipt, RedemptionError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_pay {
            return Err(RedemptionError::PaymentFailed(
                "wallet declined the charge".to_string(),
            ));
        }
        if !amount.is_positive() {
            return Err(RedemptionError::PaymentFailed(format!(
                "invalid charge amount: {amount}"
            )));
        }

        state.next_id += 1;
        state.pay_count += 1;
        let charge_id = format!("CHG-{:04}", state.next_id);
        state
            .charges
            .insert((user_id, product_id, charge_id.clone()));

        Ok(PaymentReceipt { charge_id })
    }

    async fn refund(
        &self,
        user_id: UserId,
        product_id: AggregateId,
        _amount: Money,
    ) -> Result<(), RedemptionError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_refund {
            return Err(RedemptionError::PaymentFailed(
                "wallet refund unavailable".to_string(),
            ));
        }

        state.refund_count += 1;
        // Refunding an already-refunded charge is a no-op.
        let charge = state
            .charges
            .iter()
            .find(|(u, p, _)| *u == user_id && *p == product_id)
            .cloned();
        if let Some(charge) = charge {
            state.charges.remove(&charge);
        }

        Ok(())
    }
}
