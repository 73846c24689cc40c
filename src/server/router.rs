use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::{Redirect, Response};
use axum::{Router, routing::get};
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use super::{admin, pages, public};
use crate::auth::{CsrfSigner, csrf_protect};
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::store::{CartStore, ContentStore, ItemOrderStore, OrderStore, ProductStore, UserStore};

const PROXY_TIMEOUT: Duration = Duration::from_secs(15);

const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Everything a handler needs, wired once at startup. Each repository owns
/// its own database handle; the CSRF secret is read-only after construction.
pub struct AppState {
    pub users: UserStore,
    pub products: ProductStore,
    pub orders: OrderStore,
    pub item_orders: ItemOrderStore,
    pub cart: CartStore,
    pub news: ContentStore,
    pub articles: ContentStore,
    pub csrf: CsrfSigner,
    pub notifier: Notifier,
    pub front_dir: PathBuf,
    pub img_dir: PathBuf,
    pub gost_dir: PathBuf,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn open(config: &ServerConfig, notifier: Notifier) -> Result<Self> {
        let data = &config.data_dir;
        Ok(Self {
            users: UserStore::open(data.join("users.db"))?,
            products: ProductStore::open(data.join("products.db"))?,
            orders: OrderStore::open(data.join("orders.db"))?,
            item_orders: ItemOrderStore::open(data.join("item_orders.db"))?,
            cart: CartStore::open(data.join("cart.db"))?,
            news: ContentStore::open_news(data.join("news.db"))?,
            articles: ContentStore::open_articles(data.join("articles.db"))?,
            csrf: CsrfSigner::new(),
            notifier,
            front_dir: config.front_dir.clone(),
            img_dir: config.img_dir.clone(),
            gost_dir: config.gost_dir.clone(),
            http: reqwest::Client::builder()
                .timeout(PROXY_TIMEOUT)
                .build()
                .map_err(|e| Error::Config(format!("http client: {e}")))?,
        })
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

async fn root_redirect() -> Redirect {
    Redirect::to("/front/HTML/main.html")
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let admin_api = admin::admin_router()
        .layer(middleware::from_fn_with_state(state.clone(), csrf_protect));

    // Images are re-uploaded under stable names, so caching is disabled
    let img = SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static(NO_STORE),
    )
    .layer(ServeDir::new(&state.img_dir));
    let gost = ServeDir::new(&state.gost_dir);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .merge(public::public_router())
        .nest("/api/admin", admin_api)
        .merge(pages::pages_router())
        // The front handler gates the admin HTML files by session before
        // falling through to plain file serving
        .route("/front/{*path}", get(pages::serve_front))
        .nest_service("/img", img)
        .nest_service("/gost", gost)
        .route("/", get(root_redirect))
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
