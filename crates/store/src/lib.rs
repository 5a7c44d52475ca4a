//! Relational store adapter for the commerce backend.
//!
//! Exposes the [`CommerceStore`] trait over the users, products, purchases,
//! and purchase/product association tables, with a PostgreSQL implementation
//! for production and an in-memory implementation for tests and local runs.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use common::{ProductId, PurchaseId, UserId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use records::{
    ProductPatch, ProductRecord, PurchaseItemDetail, PurchaseItemRecord, PurchaseRecord,
    UserPatch, UserRecord,
};
pub use store::CommerceStore;
