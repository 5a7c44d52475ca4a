use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{ProductId, PurchaseId, UserId};

use crate::error::{Result, StoreError};
use crate::records::{
    ProductPatch, ProductRecord, PurchaseItemDetail, PurchaseItemRecord, PurchaseRecord,
    UserPatch, UserRecord,
};
use crate::store::CommerceStore;

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    products: Vec<ProductRecord>,
    purchases: Vec<PurchaseRecord>,
    purchase_items: Vec<(PurchaseId, PurchaseItemRecord)>,
}

/// In-memory store implementation for tests and database-less local runs.
///
/// Simulates the unique and restricting foreign-key constraints of the
/// PostgreSQL schema. Compound purchase operations validate everything before
/// mutating, under a single write lock, so they are atomic by construction.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of purchase header rows.
    pub async fn purchase_count(&self) -> usize {
        self.tables.read().await.purchases.len()
    }

    /// Returns the number of line-item rows across all purchases.
    pub async fn line_item_count(&self) -> usize {
        self.tables.read().await.purchase_items.len()
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.users.clear();
        tables.products.clear();
        tables.purchases.clear();
        tables.purchase_items.clear();
    }
}

#[async_trait]
impl CommerceStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let tables = self.tables.read().await;
        let mut users = tables.users.clone();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<()> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::conflict("users_pkey"));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::conflict("users_email_key"));
        }

        tables.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<bool> {
        let mut tables = self.tables.write().await;

        if let Some(ref email) = patch.email
            && tables.users.iter().any(|u| &u.id != id && &u.email == email)
        {
            return Err(StoreError::conflict("users_email_key"));
        }

        let Some(user) = tables.users.iter_mut().find(|u| &u.id == id) else {
            return Ok(false);
        };

        if let Some(ref name) = patch.name {
            user.name = name.clone();
        }
        if let Some(ref email) = patch.email {
            user.email = email.clone();
        }
        if let Some(ref password) = patch.password {
            user.password = password.clone();
        }

        Ok(true)
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool> {
        let mut tables = self.tables.write().await;

        if tables.purchases.iter().any(|p| &p.buyer_id == id) {
            return Err(StoreError::foreign_key("purchases_buyer_id_fkey"));
        }

        let before = tables.users.len();
        tables.users.retain(|u| &u.id != id);
        Ok(tables.users.len() < before)
    }

    async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        let tables = self.tables.read().await;
        let mut products = tables.products.clone();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(products)
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<ProductRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| &p.id == id).cloned())
    }

    async fn search_products(&self, name_fragment: &str) -> Result<Vec<ProductRecord>> {
        let needle = name_fragment.to_lowercase();
        let tables = self.tables.read().await;
        let mut products: Vec<_> = tables
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn insert_product(&self, product: &ProductRecord) -> Result<()> {
        let mut tables = self.tables.write().await;

        if tables.products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::conflict("products_pkey"));
        }

        tables.products.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, id: &ProductId, patch: &ProductPatch) -> Result<bool> {
        let mut tables = self.tables.write().await;

        let Some(product) = tables.products.iter_mut().find(|p| &p.id == id) else {
            return Ok(false);
        };

        if let Some(ref name) = patch.name {
            product.name = name.clone();
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(ref description) = patch.description {
            product.description = description.clone();
        }
        if let Some(ref image_url) = patch.image_url {
            product.image_url = image_url.clone();
        }

        Ok(true)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool> {
        let mut tables = self.tables.write().await;

        if tables
            .purchase_items
            .iter()
            .any(|(_, item)| &item.product_id == id)
        {
            return Err(StoreError::foreign_key(
                "purchases_products_product_id_fkey",
            ));
        }

        let before = tables.products.len();
        tables.products.retain(|p| &p.id != id);
        Ok(tables.products.len() < before)
    }

    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        let tables = self.tables.read().await;
        let mut purchases = tables.purchases.clone();
        purchases.sort_by_key(|p| p.created_at);
        Ok(purchases)
    }

    async fn find_purchase(&self, id: &PurchaseId) -> Result<Option<PurchaseRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.purchases.iter().find(|p| &p.id == id).cloned())
    }

    async fn purchases_for_buyer(&self, buyer_id: &UserId) -> Result<Vec<PurchaseRecord>> {
        let tables = self.tables.read().await;
        let mut purchases: Vec<_> = tables
            .purchases
            .iter()
            .filter(|p| &p.buyer_id == buyer_id)
            .cloned()
            .collect();
        purchases.sort_by_key(|p| p.created_at);
        Ok(purchases)
    }

    async fn insert_purchase(
        &self,
        purchase: &PurchaseRecord,
        items: &[PurchaseItemRecord],
    ) -> Result<()> {
        let mut tables = self.tables.write().await;

        // All constraint checks run before any row is written, mirroring
        // the transactional all-or-nothing behavior of the SQL backend.
        if tables.purchases.iter().any(|p| p.id == purchase.id) {
            return Err(StoreError::conflict("purchases_pkey"));
        }
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|prev| prev.product_id == item.product_id) {
                return Err(StoreError::conflict("purchases_products_pkey"));
            }
        }

        tables.purchases.push(purchase.clone());
        for item in items {
            tables
                .purchase_items
                .push((purchase.id.clone(), item.clone()));
        }

        Ok(())
    }

    async fn delete_purchase(&self, id: &PurchaseId) -> Result<bool> {
        let mut tables = self.tables.write().await;

        tables.purchase_items.retain(|(pid, _)| pid != id);

        let before = tables.purchases.len();
        tables.purchases.retain(|p| &p.id != id);
        Ok(tables.purchases.len() < before)
    }

    async fn items_for_purchase(&self, id: &PurchaseId) -> Result<Vec<PurchaseItemDetail>> {
        let tables = self.tables.read().await;

        let mut details: Vec<_> = tables
            .purchase_items
            .iter()
            .filter(|(pid, _)| pid == id)
            .filter_map(|(_, item)| {
                tables
                    .products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|p| PurchaseItemDetail {
                        product_id: p.id.clone(),
                        name: p.name.clone(),
                        price: p.price,
                        description: p.description.clone(),
                        image_url: p.image_url.clone(),
                        quantity: item.quantity,
                    })
            })
            .collect();
        details.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(id: &str, email: &str) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            name: format!("user {id}"),
            email: email.to_string(),
            password: "secret".to_string(),
            created_at: Utc::now(),
        }
    }

    fn product(id: &str, name: &str, price: f64) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(id),
            name: name.to_string(),
            price,
            description: "a product".to_string(),
            image_url: "http://img".to_string(),
        }
    }

    fn purchase(id: &str, buyer: &str, total: f64) -> PurchaseRecord {
        PurchaseRecord {
            id: PurchaseId::new(id),
            buyer_id: UserId::new(buyer),
            total_price: total,
            paid: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_user_rejects_duplicate_email() {
        let store = InMemoryStore::new();
        store.insert_user(&user("u001", "a@example.com")).await.unwrap();

        let err = store
            .insert_user(&user("u002", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_user_applies_present_fields_only() {
        let store = InMemoryStore::new();
        store.insert_user(&user("u001", "a@example.com")).await.unwrap();

        let patch = UserPatch {
            email: Some(String::new()),
            ..Default::default()
        };
        assert!(store.update_user(&UserId::new("u001"), &patch).await.unwrap());

        let updated = store.find_user(&UserId::new("u001")).await.unwrap().unwrap();
        assert_eq!(updated.email, "");
        assert_eq!(updated.password, "secret");
    }

    #[tokio::test]
    async fn search_products_is_case_insensitive_substring() {
        let store = InMemoryStore::new();
        store.insert_product(&product("p001", "Macarrão", 10.5)).await.unwrap();
        store.insert_product(&product("p002", "arroz", 3.0)).await.unwrap();

        let hits = store.search_products("MACAR").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ProductId::new("p001"));
    }

    #[tokio::test]
    async fn insert_purchase_conflict_writes_nothing() {
        let store = InMemoryStore::new();
        store.insert_product(&product("p001", "macarrão", 10.5)).await.unwrap();

        let duplicate_items = vec![
            PurchaseItemRecord {
                product_id: ProductId::new("p001"),
                quantity: 1,
            },
            PurchaseItemRecord {
                product_id: ProductId::new("p001"),
                quantity: 2,
            },
        ];
        let err = store
            .insert_purchase(&purchase("c001", "u001", 31.5), &duplicate_items)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        assert_eq!(store.purchase_count().await, 0);
        assert_eq!(store.line_item_count().await, 0);
    }

    #[tokio::test]
    async fn delete_purchase_removes_line_items() {
        let store = InMemoryStore::new();
        store.insert_product(&product("p001", "macarrão", 10.5)).await.unwrap();

        let items = vec![PurchaseItemRecord {
            product_id: ProductId::new("p001"),
            quantity: 2,
        }];
        store
            .insert_purchase(&purchase("c001", "u001", 21.0), &items)
            .await
            .unwrap();

        assert!(store.delete_purchase(&PurchaseId::new("c001")).await.unwrap());
        assert_eq!(store.purchase_count().await, 0);
        assert_eq!(store.line_item_count().await, 0);

        // Deleting again reports a miss.
        assert!(!store.delete_purchase(&PurchaseId::new("c001")).await.unwrap());
    }

    #[tokio::test]
    async fn delete_referenced_product_is_a_foreign_key_error() {
        let store = InMemoryStore::new();
        store.insert_product(&product("p001", "macarrão", 10.5)).await.unwrap();

        let items = vec![PurchaseItemRecord {
            product_id: ProductId::new("p001"),
            quantity: 1,
        }];
        store
            .insert_purchase(&purchase("c001", "u001", 10.5), &items)
            .await
            .unwrap();

        let err = store.delete_product(&ProductId::new("p001")).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { .. }));

        // Nothing was deleted: the product, the header, and the line item
        // all survive, so the joined read still sees the item.
        assert!(store.find_product(&ProductId::new("p001")).await.unwrap().is_some());
        assert_eq!(store.line_item_count().await, 1);
        let details = store
            .items_for_purchase(&PurchaseId::new("c001"))
            .await
            .unwrap();
        assert_eq!(details.len(), 1);
    }

    #[tokio::test]
    async fn delete_user_with_purchases_is_a_foreign_key_error() {
        let store = InMemoryStore::new();
        store.insert_user(&user("u001", "a@example.com")).await.unwrap();
        store
            .insert_purchase(&purchase("c001", "u001", 0.0), &[])
            .await
            .unwrap();

        let err = store.delete_user(&UserId::new("u001")).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { .. }));
        assert!(store.find_user(&UserId::new("u001")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn items_for_purchase_joins_product_fields() {
        let store = InMemoryStore::new();
        store.insert_product(&product("p001", "macarrão", 10.5)).await.unwrap();
        store.insert_product(&product("p002", "arroz", 3.0)).await.unwrap();

        let items = vec![
            PurchaseItemRecord {
                product_id: ProductId::new("p001"),
                quantity: 2,
            },
            PurchaseItemRecord {
                product_id: ProductId::new("p002"),
                quantity: 1,
            },
        ];
        store
            .insert_purchase(&purchase("c001", "u001", 24.0), &items)
            .await
            .unwrap();

        let details = store
            .items_for_purchase(&PurchaseId::new("c001"))
            .await
            .unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].name, "macarrão");
        assert_eq!(details[0].quantity, 2);
        assert_eq!(details[1].price, 3.0);
    }
}
