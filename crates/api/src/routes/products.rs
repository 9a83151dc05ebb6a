//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::AggregateId;
use domain::{Money, Product, ProductStatus, ProductUpdate};
use event_store::EventStore;
use projections::ListingCache;
use serde::{Deserialize, Serialize};

use super::{AppState, parse_aggregate_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub stock: u32,
    pub status: Option<ProductStatus>,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub status: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: u32,
    pub status: ProductStatus,
}

impl ProductResponse {
    fn from_aggregate(product_id: AggregateId, product: &Product) -> Self {
        Self {
            product_id: product_id.to_string(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            price: product.price().units(),
            stock: product.stock(),
            status: product.status(),
        }
    }
}

const CACHE_KEYS: [&str; 3] = [
    "products:all",
    "products:status:AVAILABLE",
    "products:status:UNAVAILABLE",
];

fn cache_key(status: Option<ProductStatus>) -> String {
    match status {
        Some(status) => format!("products:status:{}", status.as_str()),
        None => "products:all".to_string(),
    }
}

/// Drops every cached product listing after a catalog mutation.
async fn invalidate_listings<S: EventStore>(state: &AppState<S>) {
    for key in CACHE_KEYS {
        state.cache.invalidate(key).await;
    }
}

fn parse_status(raw: &str) -> Result<ProductStatus, ApiError> {
    raw.parse().map_err(ApiError::Validation)
}

// -- Handlers --

/// POST /products — add a product to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product_id = AggregateId::new();
    let status = req.status.unwrap_or(ProductStatus::Available);

    let result = state
        .products
        .add_product(
            product_id,
            req.name,
            req.description,
            Money::from_units(req.price),
            req.stock,
            status,
        )
        .await?;

    invalidate_listings(&state).await;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::from_aggregate(product_id, &result.aggregate)),
    ))
}

/// GET /products — list products, optionally filtered by status.
///
/// Responses are served from the listing cache when fresh; misses rebuild
/// from the catalog read model after a projection catch-up.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let key = cache_key(status);

    if let Some(cached) = state.cache.get(&key).await {
        return Ok(Json(cached));
    }

    state
        .projection_processor
        .run_catch_up()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let products = match status {
        Some(status) => state.catalog.with_status(status).await,
        None => state.catalog.all().await,
    };
    let body = serde_json::to_value(products)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    state.cache.put(&key, body.clone(), state.cache_ttl).await;

    Ok(Json(body))
}

/// GET /products/:id — fetch a single product.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = parse_aggregate_id(&id)?;
    let product = state
        .products
        .get_product(product_id)
        .await?
        .filter(|p| !p.is_removed())
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(ProductResponse::from_aggregate(product_id, &product)))
}

/// PATCH /products/:id — partial update of catalog fields and status.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = parse_aggregate_id(&id)?;
    let status = req.status.as_deref().map(parse_status).transpose()?;

    let update = ProductUpdate {
        name: req.name,
        description: req.description,
        price: req.price.map(Money::from_units),
        stock: req.stock,
    };
    state.products.update_product(product_id, update).await?;

    let product = match status {
        Some(status) => state.products.set_status(product_id, status).await?.aggregate,
        None => state
            .products
            .get_product(product_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?,
    };

    invalidate_listings(&state).await;

    Ok(Json(ProductResponse::from_aggregate(product_id, &product)))
}

/// DELETE /products/:id — remove a product unless a shop still lists it.
#[tracing::instrument(skip(state))]
pub async fn remove<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let product_id = parse_aggregate_id(&id)?;

    state
        .products
        .get_product(product_id)
        .await?
        .filter(|p| !p.is_removed())
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;

    if state.shops.is_product_listed(product_id).await? {
        return Err(ApiError::Forbidden {
            kind: "product_in_use",
            message: format!("Product {id} is still listed by a shop"),
        });
    }

    state.products.remove_product(product_id).await?;
    invalidate_listings(&state).await;

    Ok(StatusCode::NO_CONTENT)
}
