mod account;
mod cart;
mod catalog;
mod orders;
mod proxy;
mod social;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::json;

use crate::server::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/catalog/categories", get(catalog::categories))
        .route("/api/catalog/products", get(catalog::products))
        .route("/api/search", get(catalog::search))
        .route("/api/gost", get(catalog::gost_list))
        .route("/api/featured", get(catalog::featured))
        .route("/api/product-description", get(catalog::product_description))
        .route("/api/news", get(catalog::news_list))
        .route("/api/articles", get(catalog::articles_list))
        .route(
            "/api/cart",
            get(cart::list)
                .post(cart::add)
                .patch(cart::set_qty)
                .delete(cart::remove),
        )
        .route("/api/orders", post(orders::create_order))
        .route("/api/item-order", post(orders::create_item_order))
        .route("/api/item-order/batch", post(orders::create_item_order_batch))
        .route("/api/register", post(account::register))
        .route("/api/login", post(account::login))
        .route("/api/logout", post(account::logout))
        .route("/api/me", get(account::me))
        .route("/api/social", get(social::social_links))
        .route("/api/image-proxy", get(proxy::image_proxy))
}
