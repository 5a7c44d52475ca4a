//! User CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::UserId;
use domain::{NewUser, User, UserPatch};
use store::CommerceStore;

use crate::error::ApiError;

use super::{AppState, MessageResponse};

// -- Request types --

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Partial update; absent fields keep their prior value, present fields are
/// written even when empty.
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// -- Response types --

/// User fields exposed over the API. Deliberately omits the password.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

// -- Handlers --

/// GET /users — list all users.
#[tracing::instrument(skip(state))]
pub async fn list<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.catalog.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id — fetch one user.
#[tracing::instrument(skip(state))]
pub async fn get<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.catalog.get_user(&UserId::new(id)).await?;
    Ok(Json(UserResponse::from(user)))
}

/// POST /users — sign up a new user.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .catalog
        .create_user(NewUser {
            id: UserId::new(req.id),
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// PUT /users/:id — partially update a user.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let patch = UserPatch {
        name: req.name,
        email: req.email,
        password: req.password,
    };
    state.catalog.update_user(&UserId::new(id), &patch).await?;

    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// DELETE /users/:id — delete a user.
#[tracing::instrument(skip(state))]
pub async fn remove<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_user(&UserId::new(id)).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
