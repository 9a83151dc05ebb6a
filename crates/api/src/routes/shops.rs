//! Shop listing endpoints.

use std::collections::HashSet;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::AggregateId;
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::{AppState, parse_aggregate_id};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateShopRequest {
    pub product_id: String,
}

#[derive(Serialize)]
pub struct ShopResponse {
    pub shop_id: String,
    pub product_id: String,
}

/// POST /shops — open a listing that exposes one product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateShopRequest>,
) -> Result<(StatusCode, Json<ShopResponse>), ApiError> {
    let product_id = parse_aggregate_id(&req.product_id)?;

    state
        .products
        .get_product(product_id)
        .await?
        .filter(|p| !p.is_removed())
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", req.product_id)))?;

    let shop_id = AggregateId::new();
    state.shops.list_product(shop_id, product_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ShopResponse {
            shop_id: shop_id.to_string(),
            product_id: product_id.to_string(),
        }),
    ))
}

/// GET /shops — list active shop listings.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ShopResponse>>, ApiError> {
    let listed_events = state
        .event_store
        .get_events_by_type("ShopListed")
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let shop_ids: HashSet<AggregateId> =
        listed_events.into_iter().map(|r| r.aggregate_id).collect();

    let mut responses = Vec::new();
    for shop_id in shop_ids {
        if let Some(listing) = state.shops.get_listing(shop_id).await?
            && listing.is_active()
            && let Some(product_id) = listing.product_id()
        {
            responses.push(ShopResponse {
                shop_id: shop_id.to_string(),
                product_id: product_id.to_string(),
            });
        }
    }
    responses.sort_by(|a, b| a.shop_id.cmp(&b.shop_id));

    Ok(Json(responses))
}
