//! Order capture: generic service requests plus one-click / cart checkouts.
//! Every successful write enqueues one best-effort Telegram notification.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::auth::OptionalUser;
use crate::server::AppState;
use crate::server::response::{ApiError, created_ok, status_ok};
use crate::store::NewItemOrder;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim();
    let phone = req.phone.trim();
    let email = req.email.trim();
    let id = state.orders.create(&req.service, name, phone, email)?;

    state.notifier.notify(format!(
        "🛠 Новая заявка: {}\nИмя: {}\nТелефон: {}\nEmail: {}",
        req.service, name, phone, email
    ));
    Ok(created_ok(id))
}

#[derive(Debug, Deserialize)]
pub struct ItemOrderRequest {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub phone: String,
}

/// Phone as given, or the account's phone for logged-in visitors.
fn resolve_phone(state: &AppState, phone: &str, login: &str) -> String {
    let phone = phone.trim();
    if !phone.is_empty() || login.is_empty() {
        return phone.to_string();
    }
    state
        .users
        .phone_of(login)
        .ok()
        .flatten()
        .map(|p| p.trim().to_string())
        .unwrap_or_default()
}

pub async fn create_item_order(
    State(state): State<Arc<AppState>>,
    OptionalUser(login): OptionalUser,
    Json(req): Json<ItemOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let login = login.unwrap_or_default();
    let qty = req.qty.max(1);
    let total = qty as f64 * req.price;
    let phone = resolve_phone(&state, &req.phone, &login);

    let order = NewItemOrder {
        item_id: req.item_id.trim().to_string(),
        title: req.title.trim().to_string(),
        qty,
        price: req.price,
        total,
        phone: phone.clone(),
        user_login: login.clone(),
    };
    let id = state.item_orders.create(&order)?;

    let mut msg = format!(
        "🛒 Новый заказ одним кликом\nТовар: {}\nКол-во: {}\nСумма: {:.2}",
        order.title, qty, total
    );
    if !login.is_empty() {
        let _ = write!(msg, "\nПользователь: {login}");
    }
    if !phone.is_empty() {
        let _ = write!(msg, "\nТелефон: {phone}");
    }
    state.notifier.notify(msg);

    Ok(created_ok(id))
}

#[derive(Debug, Deserialize)]
pub struct ItemOrderBatchRequest {
    #[serde(default)]
    pub items: Vec<ItemOrderRequest>,
    #[serde(default)]
    pub phone: String,
}

/// Whole-cart checkout: N rows in one transaction, one summary notification.
pub async fn create_item_order_batch(
    State(state): State<Arc<AppState>>,
    OptionalUser(login): OptionalUser,
    Json(req): Json<ItemOrderBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.items.is_empty() {
        return Err(ApiError::bad_request("empty items"));
    }
    let login = login.unwrap_or_default();
    let phone = resolve_phone(&state, &req.phone, &login);

    let orders: Vec<NewItemOrder> = req
        .items
        .iter()
        .map(|item| {
            let qty = item.qty.max(1);
            NewItemOrder {
                item_id: item.item_id.trim().to_string(),
                title: item.title.trim().to_string(),
                qty,
                price: item.price,
                total: qty as f64 * item.price,
                phone: phone.clone(),
                user_login: login.clone(),
            }
        })
        .collect();
    state.item_orders.create_batch(&orders)?;

    let mut msg = String::from("🛒 Новый заказ из корзины\n");
    if !login.is_empty() {
        let _ = writeln!(msg, "Пользователь: {login}");
    }
    if !phone.is_empty() {
        let _ = writeln!(msg, "Телефон: {phone}");
    }
    let mut grand_total = 0.0;
    for order in &orders {
        grand_total += order.total;
        let _ = writeln!(msg, "• {} — {} шт. — {:.2} ₽", order.title, order.qty, order.total);
    }
    let _ = write!(msg, "Итого: {grand_total:.2} ₽");
    state.notifier.notify(msg);

    Ok(status_ok())
}
