//! HTTP API server with observability for the redemption backend.
//!
//! Provides REST endpoints for the product catalog, shop listings and the
//! redemption ledger, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::ProjectionProcessor;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", post(routes::products::create::<S>))
        .route("/products", get(routes::products::list::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}", patch(routes::products::update::<S>))
        .route("/products/{id}", delete(routes::products::remove::<S>))
        .route("/shops", post(routes::shops::create::<S>))
        .route("/shops", get(routes::shops::list::<S>))
        .route("/redemptions", post(routes::redemptions::create::<S>))
        .route("/redemptions", get(routes::redemptions::list::<S>))
        .route("/redemptions/{id}", get(routes::redemptions::get::<S>))
        .route(
            "/redemptions/{id}/cancel",
            post(routes::redemptions::cancel::<S>),
        )
        .route(
            "/redemptions/{id}/status",
            post(routes::redemptions::update_status::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state with in-memory wallet and event
/// sink collaborators.
pub fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
    cache_ttl: Duration,
) -> (Arc<AppState<S>>, Arc<ProjectionProcessor<S>>) {
    use domain::{ProductService, ShopService};
    use projections::{CatalogView, InMemoryListingCache, LedgerView, Projection};
    use redemption::{InMemoryEventSink, InMemoryWallet, RedemptionOrchestrator};

    let wallet = InMemoryWallet::new();
    let sink = InMemoryEventSink::new();
    let orchestrator =
        RedemptionOrchestrator::new(event_store.clone(), wallet.clone(), sink.clone());

    let catalog = Arc::new(CatalogView::new());
    let ledger = Arc::new(LedgerView::new());

    let mut processor = ProjectionProcessor::new(event_store.clone());
    processor.register(Box::new(catalog.as_ref().clone()) as Box<dyn Projection>);
    processor.register(Box::new(ledger.as_ref().clone()) as Box<dyn Projection>);
    let processor = Arc::new(processor);

    let state = Arc::new(AppState {
        products: ProductService::new(event_store.clone()),
        shops: ShopService::new(event_store.clone()),
        orchestrator,
        wallet,
        catalog,
        ledger,
        cache: InMemoryListingCache::new(),
        cache_ttl,
        event_store,
        projection_processor: processor.clone(),
    });

    (state, processor)
}
