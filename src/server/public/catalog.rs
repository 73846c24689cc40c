use std::fs;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::catalog::{
    CATEGORIES, LEGACY_PRODUCTS, category_to_type_slug, legacy_title_matches, matches_subcategory,
    normalize_type_slug, sort_for_listing,
};
use crate::server::AppState;
use crate::server::response::ApiError;
use crate::types::LegacyProduct;

const DEFAULT_PAGE_SIZE: usize = 12;
const MAX_PAGE_SIZE: usize = 100;

pub async fn categories() -> impl IntoResponse {
    Json(CATEGORIES)
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsParams {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

fn page_bounds(params: &ProductsParams, total: usize) -> (usize, usize) {
    let page = params.page.unwrap_or(1).max(1) as usize;
    let limit = match params.limit {
        Some(limit) if limit > 0 && limit <= MAX_PAGE_SIZE as i64 => limit as usize,
        // out-of-range limits clamp back to the default, not to the max
        _ => DEFAULT_PAGE_SIZE,
    };
    let start = ((page - 1) * limit).min(total);
    let end = (start + limit).min(total);
    (start, end)
}

/// Paginated catalog listing: database rows filtered by the sub-category
/// classifier, or the built-in catalog while the table is still empty.
pub async fn products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let category = params.category.trim();
    let sub = params.sub.trim();

    if state.products.count().unwrap_or(0) == 0 {
        let filtered: Vec<&LegacyProduct> = LEGACY_PRODUCTS
            .iter()
            .filter(|p| category.is_empty() || p.category_id == category)
            .filter(|p| legacy_title_matches(category, sub, p.title))
            .collect();
        let (start, end) = page_bounds(&params, filtered.len());
        return page_json(&filtered[start..end]);
    }

    let product_type = if category.is_empty() {
        String::new()
    } else {
        category_to_type_slug(category).to_string()
    };
    let mut rows = state.products.list(&product_type)?;
    rows.retain(|r| matches_subcategory(category, sub, &r.subtype, &r.name, &r.size));
    sort_for_listing(&mut rows);

    let (start, end) = page_bounds(&params, rows.len());
    page_json(&rows[start..end])
}

fn page_json<T: serde::Serialize>(page: &[T]) -> Result<Json<serde_json::Value>, ApiError> {
    serde_json::to_value(page)
        .map(Json)
        .map_err(|e| ApiError::internal(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Substring search over the built-in catalog titles and descriptions.
pub async fn search(Query(params): Query<SearchParams>) -> impl IntoResponse {
    let q = params.q.trim().to_lowercase();
    if q.is_empty() {
        return Json(Vec::<&LegacyProduct>::new());
    }
    let found: Vec<&LegacyProduct> = LEGACY_PRODUCTS
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&q) || p.description.to_lowercase().contains(&q)
        })
        .collect();
    Json(found)
}

#[derive(Debug, Serialize)]
pub struct GostFile {
    pub name: String,
    pub path: String,
}

/// PDFs found in the GOST directory.
pub async fn gost_list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let entries = fs::read_dir(&state.gost_dir).map_err(|e| ApiError::internal(e.to_string()))?;
    let mut files = Vec::new();
    for entry in entries.flatten() {
        if entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_lowercase().ends_with(".pdf") {
            files.push(GostFile {
                path: format!("/gost/{name}"),
                name,
            });
        }
    }
    Ok(Json(files))
}

/// Featured products, newest first, in the reduced shape the main page
/// renders.
pub async fn featured(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let mut rows = state.products.list("")?;
    rows.sort_by(|a, b| b.id.cmp(&a.id));
    let out: Vec<serde_json::Value> = rows
        .iter()
        .filter(|r| r.featured)
        .map(|r| {
            json!({
                "id": r.id,
                "name": r.name,
                "img": r.img,
                "price": r.price,
                "in_stock": r.in_stock,
                "type_slug": normalize_type_slug(&r.kind),
                "size": r.size,
            })
        })
        .collect();
    Ok(Json(out))
}

#[derive(Debug, Default, Deserialize)]
pub struct DescriptionParams {
    #[serde(default, rename = "type")]
    pub kind: String,
}

pub async fn product_description(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DescriptionParams>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = params.kind.trim();
    let description = state.products.description(kind)?;
    Ok(Json(json!({ "type": kind, "description": description })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentParams {
    #[serde(default)]
    pub year: Option<String>,
}

pub async fn news_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContentParams>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.news.list(params.year.as_deref())?))
}

pub async fn articles_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContentParams>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.articles.list(params.year.as_deref())?))
}
