//! Purchase workflow engine.
//!
//! Earlier revisions of this system wrote a provisional purchase row and
//! deleted it when a later validation step failed, exposing a transient
//! inconsistent row to concurrent readers. This engine instead runs every
//! validation in a read-only phase and only then commits the header and all
//! line items in a single transaction.

use chrono::Utc;

use common::{PurchaseId, UserId};
use store::{CommerceStore, PurchaseItemRecord, PurchaseRecord, StoreError};

use crate::catalog::CatalogService;
use crate::entities::{NewPurchase, Purchase};
use crate::error::PurchaseError;

/// Service running the purchase-creation and -deletion workflows.
pub struct PurchaseService<S> {
    store: S,
    catalog: CatalogService<S>,
}

impl<S: CommerceStore + Clone> PurchaseService<S> {
    /// Creates a new purchase service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            store,
        }
    }

    /// Returns all purchase headers.
    pub async fn list_purchases(&self) -> Result<Vec<Purchase>, PurchaseError> {
        let purchases = self.store.list_purchases().await?;
        Ok(purchases.into_iter().map(Purchase::from).collect())
    }

    /// Creates a purchase from a validated request.
    ///
    /// Validation order: duplicate id, buyer existence, line-item shape
    /// (non-empty, positive quantities, no repeated products), product
    /// existence, price reconciliation. Nothing is written until every check
    /// has passed; the final commit is atomic.
    #[tracing::instrument(skip(self, req), fields(purchase_id = %req.id, buyer = %req.buyer))]
    pub async fn create_purchase(&self, req: NewPurchase) -> Result<Purchase, PurchaseError> {
        metrics::counter!("purchase_workflow_total").increment(1);

        match self.run_create(req).await {
            Ok(purchase) => {
                metrics::counter!("purchase_workflow_completed").increment(1);
                tracing::info!(purchase_id = %purchase.id, total = purchase.total_price, "purchase created");
                Ok(purchase)
            }
            Err(e) => {
                metrics::counter!("purchase_workflow_rejected").increment(1);
                Err(e)
            }
        }
    }

    async fn run_create(&self, req: NewPurchase) -> Result<Purchase, PurchaseError> {
        if self.store.find_purchase(&req.id).await?.is_some() {
            return Err(PurchaseError::DuplicateId(req.id));
        }

        if self.catalog.find_user(&req.buyer).await?.is_none() {
            return Err(PurchaseError::BuyerNotFound(req.buyer));
        }

        if req.items.is_empty() {
            return Err(PurchaseError::NoItems);
        }
        for (i, item) in req.items.iter().enumerate() {
            if item.quantity <= 0 {
                return Err(PurchaseError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                });
            }
            if req.items[..i].iter().any(|prev| prev.product_id == item.product_id) {
                return Err(PurchaseError::RepeatedProduct(item.product_id.clone()));
            }
        }

        let mut computed = 0.0;
        for item in &req.items {
            let Some(product) = self.catalog.find_product(&item.product_id).await? else {
                return Err(PurchaseError::ProductNotFound(item.product_id.clone()));
            };
            computed += product.price * f64::from(item.quantity);
        }

        // Exact equality is the contract: the declared total must reproduce
        // the sum bit-for-bit, with no rounding tolerance.
        if computed != req.total_price {
            return Err(PurchaseError::PriceMismatch {
                declared: req.total_price,
                computed,
            });
        }

        let record = PurchaseRecord {
            id: req.id,
            buyer_id: req.buyer,
            total_price: req.total_price,
            paid: 0,
            created_at: Utc::now(),
        };
        let items: Vec<PurchaseItemRecord> = req
            .items
            .into_iter()
            .map(|item| PurchaseItemRecord {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();

        // A concurrent writer can still win the id race between the check
        // above and this commit; only the header primary-key conflict maps
        // back to a duplicate id.
        self.store
            .insert_purchase(&record, &items)
            .await
            .map_err(|e| match e {
                StoreError::Conflict { ref constraint }
                    if constraint.contains("purchases_pkey") =>
                {
                    PurchaseError::DuplicateId(record.id.clone())
                }
                other => PurchaseError::Store(other),
            })?;

        Ok(Purchase::from(record))
    }

    /// Deletes a purchase and all of its line items atomically.
    #[tracing::instrument(skip(self))]
    pub async fn delete_purchase(&self, id: &PurchaseId) -> Result<(), PurchaseError> {
        if !self.store.delete_purchase(id).await? {
            return Err(PurchaseError::NotFound(id.clone()));
        }
        tracing::info!(purchase_id = %id, "purchase deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::ProductId;
    use store::InMemoryStore;

    use crate::entities::{NewLineItem, NewProduct, NewUser};

    use super::*;

    async fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        let catalog = CatalogService::new(store.clone());

        catalog
            .create_user(NewUser {
                id: UserId::new("u001"),
                name: "user1".to_string(),
                email: "user1@email.com".to_string(),
                password: "123456".to_string(),
            })
            .await
            .unwrap();
        catalog
            .create_product(NewProduct {
                id: ProductId::new("p001"),
                name: "macarrão".to_string(),
                price: 10.5,
                description: "pasta of the house".to_string(),
                image_url: "http://example.com/macarrao.png".to_string(),
            })
            .await
            .unwrap();
        catalog
            .create_product(NewProduct {
                id: ProductId::new("p002"),
                name: "arroz".to_string(),
                price: 3.0,
                description: "plain white rice".to_string(),
                image_url: "http://example.com/arroz.png".to_string(),
            })
            .await
            .unwrap();

        store
    }

    fn request(id: &str, buyer: &str, total: f64, items: &[(&str, i32)]) -> NewPurchase {
        NewPurchase {
            id: PurchaseId::new(id),
            buyer: UserId::new(buyer),
            total_price: total,
            items: items
                .iter()
                .map(|(product_id, quantity)| NewLineItem {
                    product_id: ProductId::new(*product_id),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn matching_total_creates_purchase_with_items() {
        let store = seeded_store().await;
        let service = PurchaseService::new(store.clone());

        // 10.5 * 2 + 3 * 1 = 24
        let purchase = service
            .create_purchase(request("c010", "u001", 24.0, &[("p001", 2), ("p002", 1)]))
            .await
            .unwrap();

        assert_eq!(purchase.id, PurchaseId::new("c010"));
        assert!(!purchase.paid);
        assert_eq!(store.purchase_count().await, 1);
        assert_eq!(store.line_item_count().await, 2);
    }

    #[tokio::test]
    async fn mismatched_total_writes_nothing() {
        let store = seeded_store().await;
        let service = PurchaseService::new(store.clone());

        let err = service
            .create_purchase(request("c010", "u001", 23.0, &[("p001", 2), ("p002", 1)]))
            .await
            .unwrap_err();
        match err {
            PurchaseError::PriceMismatch { declared, computed } => {
                assert_eq!(declared, 23.0);
                assert_eq!(computed, 24.0);
            }
            other => panic!("expected PriceMismatch, got {other:?}"),
        }

        assert_eq!(store.purchase_count().await, 0);
        assert_eq!(store.line_item_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_buyer_writes_nothing() {
        let store = seeded_store().await;
        let service = PurchaseService::new(store.clone());

        let err = service
            .create_purchase(request("c010", "u999", 24.0, &[("p001", 2), ("p002", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::BuyerNotFound(_)));

        assert_eq!(store.purchase_count().await, 0);
        assert_eq!(store.line_item_count().await, 0);
    }

    #[tokio::test]
    async fn one_unknown_product_among_valid_ones_writes_nothing() {
        let store = seeded_store().await;
        let service = PurchaseService::new(store.clone());

        let err = service
            .create_purchase(request(
                "c010",
                "u001",
                24.0,
                &[("p001", 2), ("missing", 1)],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::ProductNotFound(_)));

        assert_eq!(store.purchase_count().await, 0);
        assert_eq!(store.line_item_count().await, 0);
    }

    #[tokio::test]
    async fn empty_items_and_bad_quantities_are_rejected() {
        let store = seeded_store().await;
        let service = PurchaseService::new(store.clone());

        let err = service
            .create_purchase(request("c010", "u001", 0.0, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::NoItems));

        let err = service
            .create_purchase(request("c010", "u001", 0.0, &[("p001", 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::InvalidQuantity { .. }));

        assert_eq!(store.purchase_count().await, 0);
    }

    #[tokio::test]
    async fn repeated_product_is_rejected_before_any_write() {
        let store = seeded_store().await;
        let service = PurchaseService::new(store.clone());

        // 10.5 * 1 + 10.5 * 2 = 31.5, but the repeated product must be
        // rejected as a validation error, not as a duplicate purchase id.
        let err = service
            .create_purchase(request("c010", "u001", 31.5, &[("p001", 1), ("p001", 2)]))
            .await
            .unwrap_err();
        match err {
            PurchaseError::RepeatedProduct(product_id) => {
                assert_eq!(product_id, ProductId::new("p001"));
            }
            other => panic!("expected RepeatedProduct, got {other:?}"),
        }

        assert_eq!(store.purchase_count().await, 0);
        assert_eq!(store.line_item_count().await, 0);
    }

    #[tokio::test]
    async fn duplicate_purchase_id_is_rejected() {
        let store = seeded_store().await;
        let service = PurchaseService::new(store.clone());

        service
            .create_purchase(request("c010", "u001", 21.0, &[("p001", 2)]))
            .await
            .unwrap();

        let err = service
            .create_purchase(request("c010", "u001", 21.0, &[("p001", 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::DuplicateId(_)));

        assert_eq!(store.purchase_count().await, 1);
        assert_eq!(store.line_item_count().await, 1);
    }

    #[tokio::test]
    async fn delete_purchase_removes_items_and_reports_missing_ids() {
        let store = seeded_store().await;
        let service = PurchaseService::new(store.clone());

        service
            .create_purchase(request("c010", "u001", 21.0, &[("p001", 2)]))
            .await
            .unwrap();

        service.delete_purchase(&PurchaseId::new("c010")).await.unwrap();
        assert_eq!(store.purchase_count().await, 0);
        assert_eq!(store.line_item_count().await, 0);

        let err = service
            .delete_purchase(&PurchaseId::new("c010"))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::NotFound(_)));
    }
}
