//! Domain error taxonomies.
//!
//! The HTTP layer maps these onto status codes: not-found variants → 404,
//! duplicate variants → 409, remaining validation variants → 400, store
//! errors → 500.

use thiserror::Error;

use common::{ProductId, PurchaseId, UserId};
use store::StoreError;

/// Errors from user and product catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No user with the given id.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// No product with the given id.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// A user with the given id already exists.
    #[error("user id already in use: {0}")]
    DuplicateUserId(UserId),

    /// A user with the given email already exists.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// A product with the given id already exists.
    #[error("product id already in use: {0}")]
    DuplicateProductId(ProductId),

    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the purchase workflow and purchase views.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// No purchase with the given id.
    #[error("purchase not found: {0}")]
    NotFound(PurchaseId),

    /// A purchase with the given id already exists.
    #[error("purchase id already in use: {0}")]
    DuplicateId(PurchaseId),

    /// The buyer referenced by the purchase does not exist.
    #[error("buyer not found: {0}")]
    BuyerNotFound(UserId),

    /// The user whose purchases were requested does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// A line item references a product that does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The same product appears in more than one line item.
    #[error("product {0} appears in more than one line item")]
    RepeatedProduct(ProductId),

    /// The purchase has no line items.
    #[error("purchase must contain at least one line item")]
    NoItems,

    /// A line item has a non-positive quantity.
    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: i32,
    },

    /// The declared total does not equal the sum of line-item prices.
    #[error("declared total {declared} does not match computed total {computed}")]
    PriceMismatch { declared: f64, computed: f64 },

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
