//! News and articles CRUD. Both content kinds share one implementation; the
//! route table binds each to its store.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::response::{ApiError, created_ok, status_ok};
use crate::store::{ContentStore, SqlPatch};
use crate::types::ContentEntry;

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_text: String,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_text: Option<String>,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub id: i64,
}

fn create_entry(store: &ContentStore, req: CreateEntryRequest) -> Result<i64, ApiError> {
    let entry = ContentEntry {
        id: 0,
        title: req.title.trim().to_string(),
        short_text: req.short_text.trim().to_string(),
        full_text: req.full_text.trim().to_string(),
        published_at: if req.published_at.trim().is_empty() {
            Utc::now().format("%Y-%m-%d").to_string()
        } else {
            req.published_at.trim().to_string()
        },
        image_url: req.image_url.trim().to_string(),
    };
    if entry.title.is_empty() || entry.short_text.is_empty() || entry.full_text.is_empty() {
        return Err(ApiError::bad_request(
            "title, short_text, full_text required",
        ));
    }
    Ok(store.create(&entry)?)
}

fn update_entry(store: &ContentStore, req: UpdateEntryRequest) -> Result<(), ApiError> {
    if req.id == 0 {
        return Err(ApiError::bad_request("id required"));
    }
    let mut patch = SqlPatch::new();
    patch.set_if("title", req.title.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()));
    patch.set_if("short_text", req.short_text);
    patch.set_if("full_text", req.full_text);
    patch.set_if(
        "published_at",
        req.published_at.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
    );
    patch.set_if("image_url", req.image_url.map(|v| v.trim().to_string()));
    store.update(req.id, &patch)?;
    Ok(())
}

pub async fn list_news(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.news.list(None)?))
}

pub async fn create_news(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created_ok(create_entry(&state.news, req)?))
}

pub async fn update_news(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    update_entry(&state.news, req)?;
    Ok(status_ok())
}

pub async fn delete_news(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    if params.id == 0 {
        return Err(ApiError::bad_request("id required"));
    }
    state.news.delete(params.id)?;
    Ok(status_ok())
}

pub async fn list_articles(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.articles.list(None)?))
}

pub async fn create_articles(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created_ok(create_entry(&state.articles, req)?))
}

pub async fn update_articles(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    update_entry(&state.articles, req)?;
    Ok(status_ok())
}

pub async fn delete_articles(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    if params.id == 0 {
        return Err(ApiError::bad_request("id required"));
    }
    state.articles.delete(params.id)?;
    Ok(status_ok())
}
