mod content;
mod orders;
mod products;
mod social;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::server::AppState;

/// Admin API surface. The CSRF layer is applied by the caller; the admin
/// session gate lives in each handler's `RequireAdmin` extractor.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(orders::list_orders))
        .route("/orders/status", patch(orders::update_order_status))
        .route("/item-orders", get(orders::list_item_orders))
        .route("/item-orders/status", patch(orders::update_item_order_status))
        .route(
            "/products",
            get(products::list)
                .post(products::create)
                .patch(products::update)
                .delete(products::delete),
        )
        .route(
            "/featured",
            get(products::featured_ids).post(products::set_featured).patch(products::set_featured),
        )
        .route(
            "/product-descriptions",
            get(products::list_descriptions)
                .post(products::upsert_description)
                .patch(products::upsert_description)
                .delete(products::delete_description),
        )
        .route(
            "/users",
            get(users::list)
                .post(users::create)
                .patch(users::update)
                .delete(users::delete),
        )
        .route(
            "/news",
            get(content::list_news)
                .post(content::create_news)
                .patch(content::update_news)
                .delete(content::delete_news),
        )
        .route(
            "/articles",
            get(content::list_articles)
                .post(content::create_articles)
                .patch(content::update_articles)
                .delete(content::delete_articles),
        )
        .route(
            "/social",
            get(social::get_links)
                .patch(social::update_links)
                .post(social::update_links),
        )
}
