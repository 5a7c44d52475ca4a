//! Domain layer for the commerce backend.
//!
//! Three services sit on top of the store adapter:
//!
//! - [`CatalogService`] — users and products, with uniqueness and field
//!   checks enforced ahead of the store.
//! - [`PurchaseService`] — the purchase-creation workflow: validate
//!   everything in a read-only phase, then commit the header and line items
//!   in one atomic step. No provisional rows, no compensating deletes.
//! - [`PurchaseViews`] — the composite purchase read model (purchase +
//!   buyer + joined line items).

pub mod catalog;
pub mod entities;
pub mod error;
pub mod purchase;
pub mod views;

pub use catalog::CatalogService;
pub use common::{ProductId, PurchaseId, UserId};
pub use entities::{NewLineItem, NewProduct, NewPurchase, NewUser, Product, Purchase, User};
pub use error::{CatalogError, PurchaseError};
pub use purchase::PurchaseService;
pub use store::{ProductPatch, UserPatch};
pub use views::{BuyerSummary, LineItemView, PurchaseView, PurchaseViews};
