//! HTTP route handlers and shared application state.

pub mod health;
pub mod metrics;
pub mod products;
pub mod redemptions;
pub mod shops;

use std::sync::Arc;
use std::time::Duration;

use common::AggregateId;
use domain::{ProductService, ShopService};
use event_store::EventStore;
use projections::{CatalogView, InMemoryListingCache, LedgerView, ProjectionProcessor};
use redemption::{InMemoryEventSink, InMemoryWallet, RedemptionOrchestrator};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub products: ProductService<S>,
    pub shops: ShopService<S>,
    pub orchestrator: RedemptionOrchestrator<S, InMemoryWallet, InMemoryEventSink>,
    pub wallet: InMemoryWallet,
    pub catalog: Arc<CatalogView>,
    pub ledger: Arc<LedgerView>,
    pub cache: InMemoryListingCache,
    pub cache_ttl: Duration,
    pub event_store: S,
    pub projection_processor: Arc<ProjectionProcessor<S>>,
}

pub(crate) fn parse_aggregate_id(id: &str) -> Result<AggregateId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(AggregateId::from(uuid))
}
