//! Row-shaped records exchanged with the store.
//!
//! Patch structs carry tagged presence: a `None` field is left untouched by
//! the update, a `Some` field is written even when it holds an empty string.

use chrono::{DateTime, Utc};

use common::{ProductId, PurchaseId, UserId};

/// A row in the `users` table.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Partial update for a user row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    /// Returns true if no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// A row in the `products` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
}

/// Partial update for a product row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// Returns true if no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
    }
}

/// A row in the `purchases` table.
///
/// `paid` carries the persisted 0/1 flag; normalization to a boolean happens
/// in the domain layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub id: PurchaseId,
    pub buyer_id: UserId,
    pub total_price: f64,
    pub paid: i32,
    pub created_at: DateTime<Utc>,
}

/// A line item to persist with a purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseItemRecord {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A line item joined with its product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseItemDetail {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub quantity: i32,
}
