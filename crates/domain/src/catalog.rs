//! Catalog repository for users and products.

use chrono::Utc;

use common::{ProductId, UserId};
use store::{
    CommerceStore, ProductPatch, ProductRecord, StoreError, UserPatch, UserRecord,
};

use crate::entities::{NewProduct, NewUser, Product, User};
use crate::error::CatalogError;

/// Minimum lengths for product text fields.
const MIN_NAME_LEN: usize = 2;
const MIN_DESCRIPTION_LEN: usize = 5;
const MIN_IMAGE_URL_LEN: usize = 3;

/// Service for managing the user and product catalogs.
///
/// Enforces uniqueness and field checks before touching the store, so a
/// rejected request never reaches the adapter. A store-level conflict that
/// races past a pre-check is translated back into the same duplicate error.
pub struct CatalogService<S> {
    store: S,
}

impl<S: CommerceStore> CatalogService<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // -- users --

    /// Returns all users.
    pub async fn list_users(&self) -> Result<Vec<User>, CatalogError> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    /// Looks up a user by id without treating a miss as an error.
    ///
    /// Existence check used by the purchase workflow.
    pub async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.store.find_user(id).await?.map(User::from))
    }

    /// Returns the user with the given id.
    pub async fn get_user(&self, id: &UserId) -> Result<User, CatalogError> {
        self.store
            .find_user(id)
            .await?
            .map(User::from)
            .ok_or_else(|| CatalogError::UserNotFound(id.clone()))
    }

    /// Returns true if a user with the given email exists.
    pub async fn user_exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.store.find_user_by_email(email).await?.is_some())
    }

    /// Creates a user, rejecting duplicate ids and emails.
    #[tracing::instrument(skip(self, new), fields(user_id = %new.id))]
    pub async fn create_user(&self, new: NewUser) -> Result<User, CatalogError> {
        if self.store.find_user(&new.id).await?.is_some() {
            return Err(CatalogError::DuplicateUserId(new.id));
        }
        if self.user_exists_by_email(&new.email).await? {
            return Err(CatalogError::DuplicateEmail(new.email));
        }

        let record = UserRecord {
            id: new.id,
            name: new.name,
            email: new.email,
            password: new.password,
            created_at: Utc::now(),
        };
        self.store
            .insert_user(&record)
            .await
            .map_err(|e| user_conflict(e, &record))?;

        tracing::info!(user_id = %record.id, "user created");
        Ok(User::from(record))
    }

    /// Applies a partial update to a user.
    ///
    /// Present fields are written even when empty; absent fields keep their
    /// prior value.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, CatalogError> {
        if let Some(ref email) = patch.email
            && let Some(holder) = self.store.find_user_by_email(email).await?
            && &holder.id != id
        {
            return Err(CatalogError::DuplicateEmail(email.clone()));
        }

        let updated = self.store.update_user(id, patch).await.map_err(|e| match e {
            StoreError::Conflict { .. } => {
                CatalogError::DuplicateEmail(patch.email.clone().unwrap_or_default())
            }
            other => CatalogError::Store(other),
        })?;
        if !updated {
            return Err(CatalogError::UserNotFound(id.clone()));
        }

        self.get_user(id).await
    }

    /// Deletes a user by id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), CatalogError> {
        if !self.store.delete_user(id).await? {
            return Err(CatalogError::UserNotFound(id.clone()));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    // -- products --

    /// Returns all products.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let products = self.store.list_products().await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    /// Looks up a product by id without treating a miss as an error.
    ///
    /// Existence check used by the purchase workflow when resolving line
    /// items.
    pub async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.store.find_product(id).await?.map(Product::from))
    }

    /// Returns the product with the given id.
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.store
            .find_product(id)
            .await?
            .map(Product::from)
            .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))
    }

    /// Returns products whose name contains the fragment, case-insensitively.
    pub async fn search_products(&self, q: &str) -> Result<Vec<Product>, CatalogError> {
        let products = self.store.search_products(q).await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    /// Creates a product, rejecting duplicate ids and invalid fields.
    #[tracing::instrument(skip(self, new), fields(product_id = %new.id))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product, CatalogError> {
        validate_price(new.price)?;
        validate_text("name", &new.name, MIN_NAME_LEN)?;
        validate_text("description", &new.description, MIN_DESCRIPTION_LEN)?;
        validate_text("imageUrl", &new.image_url, MIN_IMAGE_URL_LEN)?;

        if self.store.find_product(&new.id).await?.is_some() {
            return Err(CatalogError::DuplicateProductId(new.id));
        }

        let record = ProductRecord {
            id: new.id,
            name: new.name,
            price: new.price,
            description: new.description,
            image_url: new.image_url,
        };
        self.store.insert_product(&record).await.map_err(|e| match e {
            StoreError::Conflict { .. } => CatalogError::DuplicateProductId(record.id.clone()),
            other => CatalogError::Store(other),
        })?;

        tracing::info!(product_id = %record.id, "product created");
        Ok(Product::from(record))
    }

    /// Applies a partial update to a product, validating present fields.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, CatalogError> {
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if let Some(ref name) = patch.name {
            validate_text("name", name, MIN_NAME_LEN)?;
        }
        if let Some(ref description) = patch.description {
            validate_text("description", description, MIN_DESCRIPTION_LEN)?;
        }
        if let Some(ref image_url) = patch.image_url {
            validate_text("imageUrl", image_url, MIN_IMAGE_URL_LEN)?;
        }

        if !self.store.update_product(id, patch).await? {
            return Err(CatalogError::ProductNotFound(id.clone()));
        }

        self.get_product(id).await
    }

    /// Deletes a product by id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        if !self.store.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound(id.clone()));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}

fn validate_price(price: f64) -> Result<(), CatalogError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CatalogError::InvalidField {
            field: "price",
            reason: format!("must be a positive number, got {price}"),
        });
    }
    Ok(())
}

fn validate_text(field: &'static str, value: &str, min_len: usize) -> Result<(), CatalogError> {
    if value.chars().count() < min_len {
        return Err(CatalogError::InvalidField {
            field,
            reason: format!("must be at least {min_len} characters"),
        });
    }
    Ok(())
}

/// Picks the duplicate error matching the constraint a racing insert hit.
fn user_conflict(e: StoreError, record: &UserRecord) -> CatalogError {
    match e {
        StoreError::Conflict { ref constraint } if constraint.contains("email") => {
            CatalogError::DuplicateEmail(record.email.clone())
        }
        StoreError::Conflict { .. } => CatalogError::DuplicateUserId(record.id.clone()),
        other => CatalogError::Store(other),
    }
}
