//! Cart endpoints, keyed by the anonymous `cart_id` cookie. The cookie is
//! minted on first touch so a visitor's cart follows them without an account.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{CART_COOKIE, cart_cookie, cookie_value};
use crate::server::AppState;
use crate::server::response::{ApiError, status_ok};
use crate::types::CartItem;

/// Cart id from the cookie, or a fresh one plus the Set-Cookie header that
/// introduces it.
fn cart_session(headers: &HeaderMap) -> (String, Option<String>) {
    match cookie_value(headers, CART_COOKIE).filter(|v| !v.trim().is_empty()) {
        Some(id) => (id, None),
        None => {
            let id = Uuid::new_v4().to_string();
            let cookie = cart_cookie(&id);
            (id, Some(cookie))
        }
    }
}

fn with_cart_cookie(mut response: Response, set_cookie: Option<String>) -> Response {
    if let Some(cookie) = set_cookie {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (cart_id, set_cookie) = cart_session(&headers);
    let items = state.cart.items(&cart_id)?;
    Ok(with_cart_cookie(Json(items).into_response(), set_cookie))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub qty: i64,
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<Response, ApiError> {
    let id = req.id.trim().to_string();
    if id.is_empty() {
        return Err(ApiError::bad_request("id required"));
    }
    let (cart_id, set_cookie) = cart_session(&headers);
    let item = CartItem {
        id,
        title: req.title,
        price: req.price,
        image: req.image,
        qty: req.qty.max(1),
    };
    state.cart.add(&cart_id, &item)?;
    Ok(with_cart_cookie(status_ok().into_response(), set_cookie))
}

#[derive(Debug, Deserialize)]
pub struct SetQtyRequest {
    pub id: String,
    #[serde(default)]
    pub qty: i64,
}

pub async fn set_qty(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SetQtyRequest>,
) -> Result<Response, ApiError> {
    if req.id.trim().is_empty() {
        return Err(ApiError::bad_request("id required"));
    }
    let (cart_id, set_cookie) = cart_session(&headers);
    state.cart.set_qty(&cart_id, req.id.trim(), req.qty.max(1))?;
    Ok(with_cart_cookie(status_ok().into_response(), set_cookie))
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveParams {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub all: String,
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RemoveParams>,
) -> Result<Response, ApiError> {
    let (cart_id, set_cookie) = cart_session(&headers);
    let id = params.id.trim();
    if id.is_empty() && params.all.trim() == "1" {
        state.cart.clear(&cart_id)?;
    } else if !id.is_empty() {
        state.cart.remove(&cart_id, id)?;
    } else {
        return Err(ApiError::bad_request("id or all=1 required"));
    }
    Ok(with_cart_cookie(status_ok().into_response(), set_cookie))
}
