use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::response::{ApiError, status_ok};

pub async fn list_orders(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.orders.list()?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: i64,
    #[serde(default)]
    pub status: String,
}

pub async fn update_order_status(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Service requests only know two workflow states
    if req.status != "active" && req.status != "closed" {
        return Err(ApiError::bad_request("invalid status"));
    }
    state.orders.update_status(req.id, &req.status)?;
    Ok(status_ok())
}

pub async fn list_item_orders(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.item_orders.list()?))
}

pub async fn update_item_order_status(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Item orders carry a free-text workflow label
    if req.id == 0 || req.status.trim().is_empty() {
        return Err(ApiError::bad_request("id and status required"));
    }
    state.item_orders.update_status(req.id, req.status.trim())?;
    Ok(status_ok())
}
