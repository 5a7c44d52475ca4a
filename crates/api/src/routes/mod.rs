//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod products;
pub mod purchases;
pub mod users;

use serde::Serialize;

use domain::{CatalogService, PurchaseService, PurchaseViews};
use store::CommerceStore;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CommerceStore> {
    pub backend: &'static str,
    pub catalog: CatalogService<S>,
    pub purchases: PurchaseService<S>,
    pub views: PurchaseViews<S>,
}

/// Body for mutating endpoints that confirm with a human-readable message.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
