//! Redemption ledger endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::{RedeemEntry, RedeemStatus, UserId};
use event_store::EventStore;
use projections::views::ledger::LedgerEntrySummary;
use serde::{Deserialize, Serialize};

use super::{AppState, parse_aggregate_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateRedemptionRequest {
    pub shop_id: String,
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListRedemptionsQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct RedemptionResponse {
    pub redeem_id: String,
    pub shop_id: String,
    pub user_id: String,
    pub product_id: String,
    pub price: i64,
    pub status: RedeemStatus,
    pub reversal_pending: bool,
    pub opened_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&RedeemEntry> for RedemptionResponse {
    fn from(entry: &RedeemEntry) -> Self {
        use domain::Aggregate;

        Self {
            redeem_id: entry.id().map(|id| id.to_string()).unwrap_or_default(),
            shop_id: entry.shop_id().map(|id| id.to_string()).unwrap_or_default(),
            user_id: entry.user_id().map(|id| id.to_string()).unwrap_or_default(),
            product_id: entry
                .product_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            price: entry.price().units(),
            status: entry.status(),
            reversal_pending: entry.reversal_pending(),
            opened_at: entry.opened_at(),
            updated_at: entry.updated_at(),
        }
    }
}

fn parse_status(raw: &str) -> Result<RedeemStatus, ApiError> {
    raw.parse().map_err(ApiError::Validation)
}

// -- Handlers --

/// POST /redemptions — run the purchase workflow and open a ledger entry.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateRedemptionRequest>,
) -> Result<(StatusCode, Json<RedemptionResponse>), ApiError> {
    let shop_id = parse_aggregate_id(&req.shop_id)?;
    let user_id = uuid::Uuid::parse_str(&req.user_id)
        .map(UserId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("Invalid user_id: {e}")))?;

    let entry = state.orchestrator.redeem(shop_id, user_id).await?;

    Ok((StatusCode::CREATED, Json(RedemptionResponse::from(&entry))))
}

/// GET /redemptions — list ledger entries with optional user/status filters.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListRedemptionsQuery>,
) -> Result<Json<Vec<LedgerEntrySummary>>, ApiError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let user_id = query
        .user_id
        .as_deref()
        .map(|raw| {
            uuid::Uuid::parse_str(raw)
                .map(UserId::from_uuid)
                .map_err(|e| ApiError::Validation(format!("Invalid user_id: {e}")))
        })
        .transpose()?;

    state
        .projection_processor
        .run_catch_up()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut entries = match user_id {
        Some(user_id) => state.ledger.for_user(user_id).await,
        None => state.ledger.all().await,
    };
    if let Some(status) = status {
        entries.retain(|e| e.status == status);
    }

    Ok(Json(entries))
}

/// GET /redemptions/:id — fetch a single ledger entry.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<RedemptionResponse>, ApiError> {
    let redeem_id = parse_aggregate_id(&id)?;
    let entry = state.orchestrator.get(redeem_id).await?;

    Ok(Json(RedemptionResponse::from(&entry)))
}

/// POST /redemptions/:id/cancel — cancel a waiting entry and reverse its
/// side effects.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<RedemptionResponse>, ApiError> {
    let redeem_id = parse_aggregate_id(&id)?;
    let entry = state.orchestrator.cancel(redeem_id).await?;

    Ok(Json(RedemptionResponse::from(&entry)))
}

/// POST /redemptions/:id/status — transition a waiting entry.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<RedemptionResponse>, ApiError> {
    let redeem_id = parse_aggregate_id(&id)?;
    let status = parse_status(&req.status)?;

    let entry = state.orchestrator.update_status(redeem_id, status).await?;

    Ok(Json(RedemptionResponse::from(&entry)))
}
