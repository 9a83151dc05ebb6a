//! Redemption orchestrator.

use common::AggregateId;
use domain::{
    Aggregate, DomainEvent, ProductService, RedeemEntry, RedeemService, RedeemStatus, ShopService,
    UserId,
};
use event_store::{AppendOptions, EventRecord, EventStore, Version};

use crate::aggregate::RedemptionWorkflow;
use crate::error::RedemptionError;
use crate::events::WorkflowEvent;
use crate::purchase;
use crate::services::notifier::{EventSink, RedemptionCreated};
use crate::services::wallet::WalletService;

/// Orchestrates redemption purchases and reversals.
///
/// A purchase is a two-step workflow (reserve stock, charge wallet) with
/// compensation on charge failure; the workflow instance is event-sourced.
/// Cancellations and declines follow the reversal protocol: the status
/// transition is persisted first as durable intent, then stock and wallet are
/// restored, then `ReversalCompleted` is recorded. An interrupted reversal is
/// picked up by `recover_pending_reversals`.
pub struct RedemptionOrchestrator<S, W, N>
where
    S: EventStore,
    W: WalletService,
    N: EventSink,
{
    store: S,
    products: ProductService<S>,
    shops: ShopService<S>,
    ledger: RedeemService<S>,
    wallet: W,
    sink: N,
}

impl<S, W, N> RedemptionOrchestrator<S, W, N>
where
    S: EventStore + Clone,
    W: WalletService,
    N: EventSink,
{
    pub fn new(store: S, wallet: W, sink: N) -> Self {
        let products = ProductService::new(store.clone());
        let shops = ShopService::new(store.clone());
        let ledger = RedeemService::new(store.clone());
        Self {
            store,
            products,
            shops,
            ledger,
            wallet,
            sink,
        }
    }

    /// Redeems the product listed by `shop_id` for `user_id`.
    ///
    /// On success the opened ledger entry is returned and a
    /// `RedemptionCreated` notification is published (fire-and-forget). On
    /// charge failure the reserved stock is returned before the error
    /// surfaces; no ledger entry is created.
    #[tracing::instrument(skip(self), fields(workflow_type = purchase::WORKFLOW_TYPE))]
    pub async fn redeem(
        &self,
        shop_id: AggregateId,
        user_id: UserId,
    ) -> Result<RedeemEntry, RedemptionError> {
        metrics::counter!("redemption_workflows_total").increment(1);
        let workflow_start = std::time::Instant::now();

        // 1. Resolve the listing and its product.
        let listing = self
            .shops
            .get_listing(shop_id)
            .await?
            .filter(|l| l.is_active())
            .ok_or(RedemptionError::ShopNotFound(shop_id))?;
        let product_id = listing
            .product_id()
            .ok_or(RedemptionError::ShopNotFound(shop_id))?;

        let product = self
            .products
            .get_product(product_id)
            .await?
            .filter(|p| !p.is_removed())
            .ok_or(RedemptionError::ProductNotFound(product_id))?;

        // 2. Availability guard before anything is mutated.
        if !product.is_available() {
            return Err(RedemptionError::ProductUnavailable(product_id));
        }
        let amount = product.price();

        // 3. Persist the purchase intent.
        let workflow_id = AggregateId::new();
        let mut version = Version::initial();

        let started = WorkflowEvent::workflow_started(
            workflow_id,
            purchase::WORKFLOW_TYPE,
            shop_id,
            user_id,
            product_id,
            amount,
        );
        version = self
            .append_workflow_event(workflow_id, version, &started)
            .await?;

        // 4. Step 1: reserve stock.
        tracing::info!(step = purchase::STEP_RESERVE_STOCK, "workflow step started");
        version = self
            .append_workflow_event(
                workflow_id,
                version,
                &WorkflowEvent::step_started(purchase::STEP_RESERVE_STOCK),
            )
            .await?;

        if let Err(e) = self.products.decrement_stock(product_id, 1).await {
            version = self
                .append_workflow_event(
                    workflow_id,
                    version,
                    &WorkflowEvent::step_failed(purchase::STEP_RESERVE_STOCK, e.to_string()),
                )
                .await?;
            self.append_workflow_event(
                workflow_id,
                version,
                &WorkflowEvent::workflow_failed(e.to_string()),
            )
            .await?;

            metrics::counter!("redemption_workflows_failed").increment(1);
            return Err(RedemptionError::from_reserve_failure(product_id, e));
        }
        version = self
            .append_workflow_event(
                workflow_id,
                version,
                &WorkflowEvent::step_completed(purchase::STEP_RESERVE_STOCK, None),
            )
            .await?;

        // 5. Step 2: charge the wallet.
        tracing::info!(step = purchase::STEP_CHARGE_WALLET, "workflow step started");
        version = self
            .append_workflow_event(
                workflow_id,
                version,
                &WorkflowEvent::step_started(purchase::STEP_CHARGE_WALLET),
            )
            .await?;

        let receipt = match self.wallet.pay(user_id, product_id, amount).await {
            Ok(receipt) => receipt,
            Err(e) => {
                version = self
                    .append_workflow_event(
                        workflow_id,
                        version,
                        &WorkflowEvent::step_failed(purchase::STEP_CHARGE_WALLET, e.to_string()),
                    )
                    .await?;
                version = self
                    .append_workflow_event(
                        workflow_id,
                        version,
                        &WorkflowEvent::compensation_started(purchase::STEP_CHARGE_WALLET),
                    )
                    .await?;

                // Return the reserved unit. A failure here leaves the system
                // inconsistent and must reach the caller.
                if let Err(ce) = self.products.increment_stock(product_id, 1).await {
                    self.append_workflow_event(
                        workflow_id,
                        version,
                        &WorkflowEvent::compensation_step_failed(
                            purchase::STEP_RESERVE_STOCK,
                            ce.to_string(),
                        ),
                    )
                    .await?;
                    metrics::counter!("redemption_reversal_failures").increment(1);
                    return Err(RedemptionError::ReversalFailed {
                        redeem_id: workflow_id,
                        reason: ce.to_string(),
                    });
                }
                version = self
                    .append_workflow_event(
                        workflow_id,
                        version,
                        &WorkflowEvent::compensation_step_completed(purchase::STEP_RESERVE_STOCK),
                    )
                    .await?;
                self.append_workflow_event(
                    workflow_id,
                    version,
                    &WorkflowEvent::workflow_failed(e.to_string()),
                )
                .await?;

                metrics::counter!("redemption_workflows_failed").increment(1);
                tracing::warn!(%workflow_id, %shop_id, "wallet charge failed, stock returned");
                return Err(e);
            }
        };
        version = self
            .append_workflow_event(
                workflow_id,
                version,
                &WorkflowEvent::step_completed(
                    purchase::STEP_CHARGE_WALLET,
                    Some(receipt.charge_id),
                ),
            )
            .await?;

        // 6. Open the ledger entry.
        let redeem_id = AggregateId::new();
        let result = self
            .ledger
            .open_entry(redeem_id, shop_id, user_id, product_id, amount)
            .await?;

        self.append_workflow_event(
            workflow_id,
            version,
            &WorkflowEvent::workflow_completed(redeem_id),
        )
        .await?;

        // 7. Notify; sink failures never fail the redemption.
        if let Err(e) = self
            .sink
            .publish(RedemptionCreated {
                redeem_id,
                user_id,
                shop_id,
                product_id,
            })
            .await
        {
            tracing::warn!(%redeem_id, error = %e, "redemption notification failed");
        }

        let duration = workflow_start.elapsed().as_secs_f64();
        metrics::histogram!("redemption_workflow_duration_seconds").record(duration);
        metrics::counter!("redemption_workflows_completed").increment(1);
        tracing::info!(%workflow_id, %redeem_id, duration, "redemption completed");

        Ok(result.aggregate)
    }

    /// Cancels a waiting entry, returning stock and refunding the wallet.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, redeem_id: AggregateId) -> Result<RedeemEntry, RedemptionError> {
        self.transition_with_reversal(redeem_id, RedeemStatus::Canceled)
            .await
    }

    /// Moves an entry to `new_status`.
    ///
    /// Canceled and Declined run the reversal protocol; Redeemed is a pure
    /// transition with no stock or wallet side effect.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        redeem_id: AggregateId,
        new_status: RedeemStatus,
    ) -> Result<RedeemEntry, RedemptionError> {
        self.transition_with_reversal(redeem_id, new_status).await
    }

    /// Loads a ledger entry.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, redeem_id: AggregateId) -> Result<RedeemEntry, RedemptionError> {
        self.ledger
            .get_entry(redeem_id)
            .await?
            .ok_or(RedemptionError::EntryNotFound(redeem_id))
    }

    /// Finishes reversals whose intent was persisted but whose side effects
    /// never landed. Returns the number of entries recovered.
    #[tracing::instrument(skip(self))]
    pub async fn recover_pending_reversals(&self) -> Result<usize, RedemptionError> {
        let pending = self.ledger.entries_with_pending_reversal().await?;
        let mut recovered = 0;

        for entry in pending {
            self.apply_reversal(&entry).await?;
            recovered += 1;
        }

        if recovered > 0 {
            metrics::counter!("redemption_reversals_recovered").increment(recovered as u64);
            tracing::info!(recovered, "pending reversals recovered");
        }
        Ok(recovered)
    }

    /// Loads a workflow instance by id from the event store.
    pub async fn get_workflow(
        &self,
        workflow_id: AggregateId,
    ) -> Result<Option<RedemptionWorkflow>, RedemptionError> {
        let records = self.store.get_events_for_aggregate(workflow_id).await?;
        if records.is_empty() {
            return Ok(None);
        }

        let mut workflow = RedemptionWorkflow::default();
        for record in records {
            workflow.apply(record.payload_as()?);
        }
        Ok(Some(workflow))
    }

    /// Persists the transition first, then runs the reversal when the target
    /// status requires one.
    async fn transition_with_reversal(
        &self,
        redeem_id: AggregateId,
        new_status: RedeemStatus,
    ) -> Result<RedeemEntry, RedemptionError> {
        if self.ledger.get_entry(redeem_id).await?.is_none() {
            return Err(RedemptionError::EntryNotFound(redeem_id));
        }

        // Durable intent: concurrent callers race on this versioned append,
        // so at most one transition out of WaitingApproval wins.
        let result = self.ledger.change_status(redeem_id, new_status).await?;

        if !new_status.requires_reversal() {
            return Ok(result.aggregate);
        }

        self.apply_reversal(&result.aggregate).await?;
        self.get(redeem_id).await
    }

    /// Returns stock, refunds the wallet and records `ReversalCompleted`.
    ///
    /// Any failure surfaces as `ReversalFailed` and leaves the entry flagged
    /// for recovery.
    async fn apply_reversal(&self, entry: &RedeemEntry) -> Result<(), RedemptionError> {
        let reversal_failed = |reason: String| RedemptionError::ReversalFailed {
            redeem_id: entry.id().unwrap_or_default(),
            reason,
        };
        let redeem_id = entry
            .id()
            .ok_or_else(|| reversal_failed("entry has no id".to_string()))?;
        let product_id = entry
            .product_id()
            .ok_or_else(|| reversal_failed("entry has no product".to_string()))?;
        let user_id = entry
            .user_id()
            .ok_or_else(|| reversal_failed("entry has no user".to_string()))?;

        // Refund first: it is safe to retry, while the stock increment is
        // not. A retry after a partial reversal re-runs the refund as a no-op
        // and then performs the increment once.
        self.wallet
            .refund(user_id, product_id, entry.price())
            .await
            .map_err(|e| reversal_failed(e.to_string()))?;
        self.products
            .increment_stock(product_id, 1)
            .await
            .map_err(|e| reversal_failed(e.to_string()))?;

        self.ledger.complete_reversal(redeem_id).await?;
        Ok(())
    }

    /// Appends a single workflow event to the event store.
    async fn append_workflow_event(
        &self,
        workflow_id: AggregateId,
        current_version: Version,
        event: &WorkflowEvent,
    ) -> Result<Version, RedemptionError> {
        let record = EventRecord::new(
            workflow_id,
            RedemptionWorkflow::aggregate_type(),
            event.event_type(),
            current_version.next(),
            event,
        )?;

        let new_version = self
            .store
            .append(vec![record], AppendOptions::expect_version(current_version))
            .await?;

        Ok(new_version)
    }
}
