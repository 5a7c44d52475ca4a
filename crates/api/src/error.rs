//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{CatalogError, PurchaseError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Catalog (user/product) error.
    Catalog(CatalogError),
    /// Purchase workflow or view error.
    Purchase(PurchaseError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Purchase(err) => purchase_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::UserNotFound(_) | CatalogError::ProductNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CatalogError::DuplicateUserId(_)
        | CatalogError::DuplicateEmail(_)
        | CatalogError::DuplicateProductId(_) => (StatusCode::CONFLICT, err.to_string()),
        CatalogError::InvalidField { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        CatalogError::Store(store_err) => {
            tracing::error!(error = %store_err, "store error");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
        }
    }
}

fn purchase_error_to_response(err: PurchaseError) -> (StatusCode, String) {
    match &err {
        PurchaseError::NotFound(_)
        | PurchaseError::BuyerNotFound(_)
        | PurchaseError::UserNotFound(_)
        | PurchaseError::ProductNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        PurchaseError::DuplicateId(_) => (StatusCode::CONFLICT, err.to_string()),
        PurchaseError::NoItems
        | PurchaseError::InvalidQuantity { .. }
        | PurchaseError::RepeatedProduct(_)
        | PurchaseError::PriceMismatch { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        PurchaseError::Store(store_err) => {
            tracing::error!(error = %store_err, "store error");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<PurchaseError> for ApiError {
    fn from(err: PurchaseError) -> Self {
        ApiError::Purchase(err)
    }
}
