//! Domain entities and creation payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{ProductId, PurchaseId, UserId};
use store::{ProductRecord, PurchaseRecord, UserRecord};

/// A registered user account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            password: r.password,
            created_at: r.created_at,
        }
    }
}

/// Payload for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            price: r.price,
            description: r.description,
            image_url: r.image_url,
        }
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
}

/// A purchase header with the paid flag normalized to a boolean.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub buyer_id: UserId,
    pub total_price: f64,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PurchaseRecord> for Purchase {
    fn from(r: PurchaseRecord) -> Self {
        Self {
            id: r.id,
            buyer_id: r.buyer_id,
            total_price: r.total_price,
            paid: r.paid != 0,
            created_at: r.created_at,
        }
    }
}

/// Payload for the purchase-creation workflow.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub id: PurchaseId,
    pub buyer: UserId,
    pub total_price: f64,
    pub items: Vec<NewLineItem>,
}

/// One product + quantity entry within a purchase request.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_normalizes_paid_flag() {
        let record = PurchaseRecord {
            id: PurchaseId::new("c001"),
            buyer_id: UserId::new("u001"),
            total_price: 15.0,
            paid: 1,
            created_at: Utc::now(),
        };
        assert!(Purchase::from(record.clone()).paid);

        let unpaid = PurchaseRecord { paid: 0, ..record };
        assert!(!Purchase::from(unpaid).paid);
    }
}
