//! Product CRUD and search endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use common::ProductId;
use domain::{NewProduct, Product, ProductPatch};
use store::CommerceStore;

use crate::error::ApiError;

use super::{AppState, MessageResponse};

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
}

/// Partial update; absent fields keep their prior value.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

// -- Handlers --

/// GET /products — list all products.
#[tracing::instrument(skip(state))]
pub async fn list<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list_products().await?))
}

/// GET /products/search?q= — search products by name.
#[tracing::instrument(skip(state))]
pub async fn search<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.search_products(&query.q).await?))
}

/// GET /products/:id — fetch one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.get_product(&ProductId::new(id)).await?))
}

/// POST /products — register a new product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .catalog
        .create_product(NewProduct {
            id: ProductId::new(req.id),
            name: req.name,
            price: req.price,
            description: req.description,
            image_url: req.image_url,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Product registered successfully")),
    ))
}

/// PUT /products/:id — partially update a product.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let patch = ProductPatch {
        name: req.name,
        price: req.price,
        description: req.description,
        image_url: req.image_url,
    };
    state
        .catalog
        .update_product(&ProductId::new(id), &patch)
        .await?;

    Ok(Json(MessageResponse::new("Product updated successfully")))
}

/// DELETE /products/:id — delete a product.
#[tracing::instrument(skip(state))]
pub async fn remove<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_product(&ProductId::new(id)).await?;

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
