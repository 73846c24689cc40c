use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::auth::{RequireAdmin, hash_password};
use crate::server::AppState;
use crate::server::response::{ApiError, created_ok, status_ok};
use crate::store::SqlPatch;

pub async fn list(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.users.list()?))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_admin: bool,
}

pub async fn create(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let login = req.login.trim();
    if login.is_empty() || req.password.trim().is_empty() {
        return Err(ApiError::bad_request("login and password required"));
    }
    let hash = hash_password(&req.password)?;
    let id = state
        .users
        .create(login, &hash, &req.email, &req.phone, req.is_admin)?;
    Ok(created_ok(id))
}

/// Presence-tracked except `is_admin`, which is always written so the admin
/// panel's checkbox can both grant and revoke.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: i64,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

pub async fn update(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.id == 0 {
        return Err(ApiError::bad_request("id required"));
    }

    let mut patch = SqlPatch::new();
    patch.set_if("login", req.login.filter(|l| !l.trim().is_empty()));
    patch.set_if("email", req.email);
    patch.set_if("phone", req.phone);
    if let Some(password) = req.password.filter(|p| !p.is_empty()) {
        patch.set("password_hash", hash_password(&password)?);
    }
    patch.set("is_admin", req.is_admin as i64);

    state.users.update(req.id, &patch)?;
    Ok(status_ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub id: i64,
}

pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    if params.id == 0 {
        return Err(ApiError::bad_request("id required"));
    }
    state.users.delete(params.id)?;
    Ok(status_ok())
}
