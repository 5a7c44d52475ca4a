use sqlx::{PgPool, Row, postgres::PgRow};

use common::{ProductId, PurchaseId, UserId};

use crate::error::{Result, StoreError};
use crate::records::{
    ProductPatch, ProductRecord, PurchaseItemDetail, PurchaseItemRecord, PurchaseRecord,
    UserPatch, UserRecord,
};
use crate::store::CommerceStore;

use async_trait::async_trait;

/// PostgreSQL-backed store implementation.
///
/// All queries are parameterized; multi-statement purchase operations run
/// inside a transaction on a single pooled connection.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_user(row: PgRow) -> Result<UserRecord> {
        Ok(UserRecord {
            id: UserId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<ProductRecord> {
        Ok(ProductRecord {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
        })
    }

    fn row_to_purchase(row: PgRow) -> Result<PurchaseRecord> {
        Ok(PurchaseRecord {
            id: PurchaseId::new(row.try_get::<String, _>("id")?),
            buyer_id: UserId::new(row.try_get::<String, _>("buyer_id")?),
            total_price: row.try_get("total_price")?,
            paid: row.try_get("paid")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_item_detail(row: PgRow) -> Result<PurchaseItemDetail> {
        Ok(PurchaseItemDetail {
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

/// Maps a unique-violation failure to a named conflict; everything else
/// stays a database error. The constraint name comes from the server when
/// it reports one (e.g. `users_pkey`, `users_email_key`).
fn map_unique_violation(e: sqlx::Error, fallback: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or(fallback).to_string();
        return StoreError::Conflict { constraint };
    }
    StoreError::Database(e)
}

/// Maps a foreign-key failure on a delete to a named restrict error.
fn map_fk_violation(e: sqlx::Error, fallback: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        let constraint = db_err.constraint().unwrap_or(fallback).to_string();
        return StoreError::ForeignKey { constraint };
    }
    StoreError::Database(e)
}

#[async_trait]
impl CommerceStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let rows = sqlx::query("SELECT id, name, email, password, created_at FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<UserRecord>> {
        let row =
            sqlx::query("SELECT id, name, email, password, created_at FROM users WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row =
            sqlx::query("SELECT id, name, email, password, created_at FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "users_pkey"))?;

        Ok(())
    }

    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<bool> {
        // NULL binds fall through COALESCE, keeping the current value;
        // a present empty string is written as-is.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password = COALESCE($4, password)
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.password.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "users_email_key"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_fk_violation(e, "purchases_buyer_id_fkey"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, price, description, image_url FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<ProductRecord>> {
        let row = sqlx::query(
            "SELECT id, name, price, description, image_url FROM products WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn search_products(&self, name_fragment: &str) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price, description, image_url
            FROM products
            WHERE name ILIKE '%' || $1 || '%'
            ORDER BY name
            "#,
        )
        .bind(name_fragment)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn insert_product(&self, product: &ProductRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, description, image_url)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "products_pkey"))?;

        Ok(())
    }

    async fn update_product(&self, id: &ProductId, patch: &ProductPatch) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url)
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(patch.name.as_deref())
        .bind(patch.price)
        .bind(patch.description.as_deref())
        .bind(patch.image_url.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_fk_violation(e, "purchases_products_product_id_fkey"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        let rows = sqlx::query(
            "SELECT id, buyer_id, total_price, paid, created_at FROM purchases ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_purchase).collect()
    }

    async fn find_purchase(&self, id: &PurchaseId) -> Result<Option<PurchaseRecord>> {
        let row = sqlx::query(
            "SELECT id, buyer_id, total_price, paid, created_at FROM purchases WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_purchase).transpose()
    }

    async fn purchases_for_buyer(&self, buyer_id: &UserId) -> Result<Vec<PurchaseRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, total_price, paid, created_at
            FROM purchases
            WHERE buyer_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(buyer_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_purchase).collect()
    }

    async fn insert_purchase(
        &self,
        purchase: &PurchaseRecord,
        items: &[PurchaseItemRecord],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (id, buyer_id, total_price, paid, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(purchase.id.as_str())
        .bind(purchase.buyer_id.as_str())
        .bind(purchase.total_price)
        .bind(purchase.paid)
        .bind(purchase.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "purchases_pkey"))?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO purchases_products (purchases_id, product_id, quantify)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(purchase.id.as_str())
            .bind(item.product_id.as_str())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, "purchases_products_pkey"))?;
        }

        // Dropping the transaction without this rolls everything back.
        tx.commit().await?;

        Ok(())
    }

    async fn delete_purchase(&self, id: &PurchaseId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM purchases_products WHERE purchases_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn items_for_purchase(&self, id: &PurchaseId) -> Result<Vec<PurchaseItemDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT pp.product_id, p.name, p.price, p.description, p.image_url,
                   pp.quantify AS quantity
            FROM purchases_products pp
            JOIN products p ON p.id = pp.product_id
            WHERE pp.purchases_id = $1
            ORDER BY pp.product_id
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item_detail).collect()
    }
}
