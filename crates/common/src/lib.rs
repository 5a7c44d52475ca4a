//! Shared identifier types used across the commerce backend.

pub mod types;

pub use types::{ProductId, PurchaseId, UserId};
