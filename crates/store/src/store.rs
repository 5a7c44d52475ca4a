use async_trait::async_trait;

use common::{ProductId, PurchaseId, UserId};

use crate::Result;
use crate::records::{
    ProductPatch, ProductRecord, PurchaseItemDetail, PurchaseItemRecord, PurchaseRecord,
    UserPatch, UserRecord,
};

/// Core trait for relational store implementations.
///
/// Covers the four commerce tables with parameterized single-statement
/// operations plus the two compound purchase operations, which are atomic:
/// either every statement takes effect or none does. All implementations
/// must be thread-safe (Send + Sync).
#[async_trait]
pub trait CommerceStore: Send + Sync {
    /// Short name of the backing storage, surfaced in the health endpoint.
    fn backend(&self) -> &'static str;

    // -- users --

    /// Returns all user rows.
    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    /// Looks up a user by id.
    async fn find_user(&self, id: &UserId) -> Result<Option<UserRecord>>;

    /// Looks up a user by email address.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Inserts a user row.
    ///
    /// Fails with [`StoreError::Conflict`](crate::StoreError::Conflict) if
    /// the id or email is already taken.
    async fn insert_user(&self, user: &UserRecord) -> Result<()>;

    /// Applies a partial update to a user row.
    ///
    /// Returns false if no row matched the id.
    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<bool>;

    /// Deletes a user row. Returns false if no row matched the id.
    ///
    /// Fails with [`StoreError::ForeignKey`](crate::StoreError::ForeignKey)
    /// if purchases still reference the user.
    async fn delete_user(&self, id: &UserId) -> Result<bool>;

    // -- products --

    /// Returns all product rows.
    async fn list_products(&self) -> Result<Vec<ProductRecord>>;

    /// Looks up a product by id.
    async fn find_product(&self, id: &ProductId) -> Result<Option<ProductRecord>>;

    /// Returns products whose name contains the fragment, case-insensitively.
    async fn search_products(&self, name_fragment: &str) -> Result<Vec<ProductRecord>>;

    /// Inserts a product row.
    async fn insert_product(&self, product: &ProductRecord) -> Result<()>;

    /// Applies a partial update to a product row.
    ///
    /// Returns false if no row matched the id.
    async fn update_product(&self, id: &ProductId, patch: &ProductPatch) -> Result<bool>;

    /// Deletes a product row. Returns false if no row matched the id.
    ///
    /// Fails with [`StoreError::ForeignKey`](crate::StoreError::ForeignKey)
    /// if line items still reference the product.
    async fn delete_product(&self, id: &ProductId) -> Result<bool>;

    // -- purchases --

    /// Returns all purchase header rows.
    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>>;

    /// Looks up a purchase header by id.
    async fn find_purchase(&self, id: &PurchaseId) -> Result<Option<PurchaseRecord>>;

    /// Returns all purchase headers for a buyer.
    async fn purchases_for_buyer(&self, buyer_id: &UserId) -> Result<Vec<PurchaseRecord>>;

    /// Inserts a purchase header together with its line items.
    ///
    /// The header and all items commit atomically: a failure on any
    /// statement leaves neither the header nor any item visible.
    async fn insert_purchase(
        &self,
        purchase: &PurchaseRecord,
        items: &[PurchaseItemRecord],
    ) -> Result<()>;

    /// Deletes a purchase header and all of its line items atomically.
    ///
    /// Returns false if no header matched the id.
    async fn delete_purchase(&self, id: &PurchaseId) -> Result<bool>;

    /// Returns the line items of a purchase joined with their product rows.
    async fn items_for_purchase(&self, id: &PurchaseId) -> Result<Vec<PurchaseItemDetail>>;
}
