//! Composite purchase read models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{ProductId, PurchaseId, UserId};
use store::CommerceStore;

use crate::entities::Purchase;
use crate::error::PurchaseError;

/// Buyer fields embedded in a purchase view. Never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// One line item joined with its product fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemView {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub quantity: i32,
}

/// A purchase assembled with its buyer and line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
    pub purchase_id: PurchaseId,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub is_paid: bool,
    pub buyer: BuyerSummary,
    pub line_items: Vec<LineItemView>,
}

/// Read-side assembler for purchase data.
pub struct PurchaseViews<S> {
    store: S,
}

impl<S: CommerceStore> PurchaseViews<S> {
    /// Creates a new view assembler over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Assembles the composite view of one purchase.
    ///
    /// Three independent read-only queries: header, buyer, joined line
    /// items. The stored 0/1 paid flag is normalized to a boolean.
    #[tracing::instrument(skip(self))]
    pub async fn purchase_view(&self, id: &PurchaseId) -> Result<PurchaseView, PurchaseError> {
        let Some(header) = self.store.find_purchase(id).await? else {
            return Err(PurchaseError::NotFound(id.clone()));
        };

        let buyer = self
            .store
            .find_user(&header.buyer_id)
            .await?
            .ok_or_else(|| PurchaseError::BuyerNotFound(header.buyer_id.clone()))?;

        let items = self.store.items_for_purchase(id).await?;

        Ok(PurchaseView {
            purchase_id: header.id,
            total_price: header.total_price,
            created_at: header.created_at,
            is_paid: header.paid != 0,
            buyer: BuyerSummary {
                id: buyer.id,
                name: buyer.name,
                email: buyer.email,
            },
            line_items: items
                .into_iter()
                .map(|item| LineItemView {
                    product_id: item.product_id,
                    name: item.name,
                    price: item.price,
                    description: item.description,
                    image_url: item.image_url,
                    quantity: item.quantity,
                })
                .collect(),
        })
    }

    /// Returns all purchase headers for a user, verifying the user exists.
    #[tracing::instrument(skip(self))]
    pub async fn purchases_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Purchase>, PurchaseError> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(PurchaseError::UserNotFound(user_id.clone()));
        }

        let purchases = self.store.purchases_for_buyer(user_id).await?;
        Ok(purchases.into_iter().map(Purchase::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use store::InMemoryStore;

    use crate::catalog::CatalogService;
    use crate::entities::{NewLineItem, NewProduct, NewPurchase, NewUser};
    use crate::purchase::PurchaseService;

    use super::*;

    async fn seeded() -> (InMemoryStore, PurchaseViews<InMemoryStore>) {
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

        let views = PurchaseViews::new(store.clone());
        (store, views)
    }

    async fn create_example_purchase(store: &InMemoryStore) {
        let service = PurchaseService::new(store.clone());
        service
            .create_purchase(NewPurchase {
                id: PurchaseId::new("c010"),
                buyer: UserId::new("u001"),
                total_price: 24.0,
                items: vec![
                    NewLineItem {
                        product_id: ProductId::new("p001"),
                        quantity: 2,
                    },
                    NewLineItem {
                        product_id: ProductId::new("p002"),
                        quantity: 1,
                    },
                ],
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn view_joins_buyer_and_line_items() {
        let (store, views) = seeded().await;
        create_example_purchase(&store).await;

        let view = views.purchase_view(&PurchaseId::new("c010")).await.unwrap();

        assert_eq!(view.purchase_id, PurchaseId::new("c010"));
        assert_eq!(view.total_price, 24.0);
        assert!(!view.is_paid);
        assert_eq!(view.buyer.id, UserId::new("u001"));
        assert_eq!(view.buyer.email, "user1@email.com");

        assert_eq!(view.line_items.len(), 2);
        assert_eq!(view.line_items[0].product_id, ProductId::new("p001"));
        assert_eq!(view.line_items[0].quantity, 2);
        assert_eq!(view.line_items[1].product_id, ProductId::new("p002"));
        assert_eq!(view.line_items[1].quantity, 1);
    }

    #[tokio::test]
    async fn view_serializes_paid_as_bool() {
        let (store, views) = seeded().await;
        create_example_purchase(&store).await;

        let view = views.purchase_view(&PurchaseId::new("c010")).await.unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["isPaid"], serde_json::Value::Bool(false));
        assert_eq!(json["purchaseId"], "c010");
        assert_eq!(json["lineItems"].as_array().unwrap().len(), 2);
        assert!(json["buyer"].get("password").is_none());
    }

    #[tokio::test]
    async fn missing_purchase_is_not_found() {
        let (_store, views) = seeded().await;

        let err = views
            .purchase_view(&PurchaseId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleted_purchase_view_is_not_found() {
        let (store, views) = seeded().await;
        create_example_purchase(&store).await;

        let service = PurchaseService::new(store.clone());
        service.delete_purchase(&PurchaseId::new("c010")).await.unwrap();

        let err = views
            .purchase_view(&PurchaseId::new("c010"))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::NotFound(_)));
        assert_eq!(store.line_item_count().await, 0);
    }

    #[tokio::test]
    async fn purchases_for_user_checks_existence() {
        let (store, views) = seeded().await;
        create_example_purchase(&store).await;

        let purchases = views.purchases_for_user(&UserId::new("u001")).await.unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].id, PurchaseId::new("c010"));

        let err = views
            .purchases_for_user(&UserId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::UserNotFound(_)));
    }
}
