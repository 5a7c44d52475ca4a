//! Purchase workflow and view endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use common::{ProductId, PurchaseId, UserId};
use domain::{NewLineItem, NewPurchase, Purchase, PurchaseView};
use store::CommerceStore;

use crate::error::ApiError;

use super::{AppState, MessageResponse};

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub id: String,
    pub buyer: String,
    pub total_price: f64,
    pub products: Vec<PurchaseItemRequest>,
}

#[derive(Deserialize)]
pub struct PurchaseItemRequest {
    pub id: String,
    pub quantity: i32,
}

// -- Handlers --

/// GET /purchases — list all purchase headers.
#[tracing::instrument(skip(state))]
pub async fn list<S: CommerceStore + Clone>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Purchase>>, ApiError> {
    Ok(Json(state.purchases.list_purchases().await?))
}

/// GET /purchases/:id — composite purchase view (buyer + line items).
#[tracing::instrument(skip(state))]
pub async fn get<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseView>, ApiError> {
    let view = state.views.purchase_view(&PurchaseId::new(id)).await?;
    Ok(Json(view))
}

/// GET /users/:id/purchases — all purchases of one user.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Purchase>>, ApiError> {
    let purchases = state.views.purchases_for_user(&UserId::new(id)).await?;
    Ok(Json(purchases))
}

/// POST /purchases — run the purchase-creation workflow.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CommerceStore + Clone>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let items = req
        .products
        .into_iter()
        .map(|item| NewLineItem {
            product_id: ProductId::new(item.id),
            quantity: item.quantity,
        })
        .collect();

    state
        .purchases
        .create_purchase(NewPurchase {
            id: PurchaseId::new(req.id),
            buyer: UserId::new(req.buyer),
            total_price: req.total_price,
            items,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Purchase registered successfully")),
    ))
}

/// DELETE /purchases/:id — delete a purchase and its line items.
#[tracing::instrument(skip(state))]
pub async fn remove<S: CommerceStore + Clone>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .purchases
        .delete_purchase(&PurchaseId::new(id))
        .await?;

    Ok(Json(MessageResponse::new("Purchase deleted successfully")))
}
