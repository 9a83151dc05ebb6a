//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ProductError, RedeemError, ShopError};
use event_store::EventStoreError;
use redemption::RedemptionError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Malformed request from the client.
    BadRequest(String),
    /// Request shape is fine but a field value is not.
    Validation(String),
    /// The operation is not allowed in the resource's current state.
    Forbidden { kind: &'static str, message: String },
    /// Domain rule violation.
    Domain(DomainError),
    /// Redemption orchestration error.
    Redemption(RedemptionError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
            ApiError::Forbidden { kind, message } => (StatusCode::FORBIDDEN, kind, message),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Redemption(err) => redemption_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };

        let body = serde_json::json!({ "error": kind, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match &err {
        DomainError::Product(product_err) => match product_err {
            ProductError::NotInCatalog => (StatusCode::NOT_FOUND, "not_found", message),
            ProductError::AlreadyExists => (StatusCode::CONFLICT, "conflict", message),
            ProductError::OutOfStock { .. } => {
                (StatusCode::BAD_REQUEST, "product_unavailable", message)
            }
            ProductError::InvalidQuantity { .. }
            | ProductError::InvalidPrice { .. }
            | ProductError::NameRequired => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", message)
            }
        },
        DomainError::Shop(ShopError::AlreadyListed) => (StatusCode::CONFLICT, "conflict", message),
        DomainError::Shop(ShopError::NotListed) => (StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Redeem(redeem_err) => match redeem_err {
            RedeemError::AlreadyCompleted => {
                (StatusCode::FORBIDDEN, "already_completed", message)
            }
            RedeemError::InvalidTransition { .. } => {
                (StatusCode::FORBIDDEN, "invalid_state", message)
            }
            RedeemError::AlreadyOpened => (StatusCode::CONFLICT, "conflict", message),
            RedeemError::NoReversalPending => (StatusCode::CONFLICT, "conflict", message),
        },
        DomainError::AggregateNotFound { .. } => (StatusCode::NOT_FOUND, "not_found", message),
        DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => {
            (StatusCode::CONFLICT, "conflict", message)
        }
        _ => {
            tracing::error!(error = %message, "domain error");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
        }
    }
}

fn redemption_error_to_response(err: RedemptionError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match err {
        RedemptionError::ShopNotFound(_)
        | RedemptionError::ProductNotFound(_)
        | RedemptionError::EntryNotFound(_) => (StatusCode::NOT_FOUND, "not_found", message),
        RedemptionError::ProductUnavailable(_) => {
            (StatusCode::BAD_REQUEST, "product_unavailable", message)
        }
        RedemptionError::PaymentFailed(_) => {
            (StatusCode::PAYMENT_REQUIRED, "payment_failed", message)
        }
        RedemptionError::InvalidState { .. } => (StatusCode::FORBIDDEN, "invalid_state", message),
        RedemptionError::AlreadyCompleted => {
            (StatusCode::FORBIDDEN, "already_completed", message)
        }
        RedemptionError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", message),
        RedemptionError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => {
            (StatusCode::CONFLICT, "conflict", message)
        }
        RedemptionError::Domain(domain_err) => domain_error_to_response(domain_err),
        RedemptionError::ReversalFailed { .. } => {
            tracing::error!(error = %message, "reversal failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "reversal_failed", message)
        }
        _ => {
            tracing::error!(error = %message, "redemption error");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<RedemptionError> for ApiError {
    fn from(err: RedemptionError) -> Self {
        ApiError::Redemption(err)
    }
}
