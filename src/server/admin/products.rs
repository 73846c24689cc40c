use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::auth::RequireAdmin;
use crate::catalog::normalize_type_slug;
use crate::server::AppState;
use crate::server::response::{ApiError, status_ok};
use crate::store::SqlPatch;
use crate::types::{ProductRow, TypeDescription};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub order: String,
}

pub async fn list(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rows = state.products.list(params.kind.trim())?;

    let q = params.q.trim().to_lowercase();
    if !q.is_empty() {
        rows.retain(|r| format!("{} {}", r.name, r.size).to_lowercase().contains(&q));
    }

    let desc = params.order.trim().eq_ignore_ascii_case("desc");
    let asc = params.order.trim().eq_ignore_ascii_case("asc");
    match params.sort.trim() {
        "price" => rows.sort_by(|a, b| {
            let ord = a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal);
            if asc { ord } else { ord.reverse() }
        }),
        "name" => rows.sort_by(|a, b| {
            let ord = a.name.cmp(&b.name);
            if desc { ord.reverse() } else { ord }
        }),
        // newest first unless explicitly asked otherwise
        _ => rows.sort_by(|a, b| if asc { a.id.cmp(&b.id) } else { b.id.cmp(&a.id) }),
    }

    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub img: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub price_per_ton: f64,
    #[serde(default)]
    pub thickness_mm: f64,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub length_m: f64,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sku: String,
}

fn generate_sku(kind: &str, name: &str) -> String {
    let mut base = normalize_type_slug(kind);
    if base.is_empty() {
        base = "item".to_string();
    }
    format!(
        "{}-{}",
        base.to_uppercase(),
        name.trim().to_uppercase().replace(' ', "-")
    )
}

pub async fn create(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = req.kind.trim().to_string();
    let name = req.name.trim().to_string();
    if kind.is_empty() || name.is_empty() {
        return Err(ApiError::bad_request("type and name required"));
    }

    let sku = if req.sku.trim().is_empty() {
        generate_sku(&kind, &name)
    } else {
        req.sku.trim().to_string()
    };

    let mut row = ProductRow {
        kind,
        name,
        size: req.size.trim().to_string(),
        subtype: req.subtype.trim().to_string(),
        img: req.img.trim().to_string(),
        price: req.price,
        price_per_ton: req.price_per_ton,
        thickness_mm: req.thickness_mm,
        weight_kg: req.weight_kg,
        length_m: req.length_m,
        in_stock: req.in_stock,
        featured: req.featured,
        sku,
        ..ProductRow::default()
    };
    row.id = state.products.insert(&row)?;
    Ok(Json(row))
}

/// Presence-tracked PATCH body. Subtype and availability are always written
/// (clearing the subtype is how a row leaves a sub-filter); everything else
/// only when the field is present.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub id: i64,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_per_ton: Option<f64>,
    #[serde(default)]
    pub thickness_mm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub sku: Option<String>,
}

pub async fn update(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.id == 0 {
        return Err(ApiError::bad_request("id required"));
    }

    let mut patch = SqlPatch::new();
    patch.set("subtype", req.subtype.unwrap_or_default().trim().to_string());
    patch.set("in_stock", req.in_stock.unwrap_or(true) as i64);
    patch.set_if("type", req.kind.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()));
    patch.set_if("name", req.name.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()));
    patch.set_if("size", req.size);
    patch.set_if("img", req.img);
    patch.set_if("price", req.price);
    patch.set_if("price_per_ton", req.price_per_ton);
    patch.set_if("thickness_mm", req.thickness_mm);
    patch.set_if("weight_kg", req.weight_kg);
    patch.set_if("length_m", req.length_m);
    patch.set_if("sku", req.sku.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()));

    state.products.update(req.id, &patch)?;
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
    state.products.delete(params.id)?;
    Ok(status_ok())
}

pub async fn featured_ids(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.products.featured_ids()?))
}

#[derive(Debug, Deserialize)]
pub struct SetFeaturedRequest {
    pub id: i64,
    #[serde(default)]
    pub featured: bool,
}

pub async fn set_featured(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFeaturedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.id == 0 {
        return Err(ApiError::bad_request("id required"));
    }
    state.products.set_featured(req.id, req.featured)?;
    Ok(status_ok())
}

pub async fn list_descriptions(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.products.descriptions()?))
}

pub async fn upsert_description(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<TypeDescription>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = req.kind.trim();
    if kind.is_empty() {
        return Err(ApiError::bad_request("type required"));
    }
    state.products.upsert_description(kind, &req.description)?;
    Ok(status_ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct DescriptionParams {
    #[serde(default, rename = "type")]
    pub kind: String,
}

pub async fn delete_description(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DescriptionParams>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = params.kind.trim();
    if kind.is_empty() {
        return Err(ApiError::bad_request("type required"));
    }
    state.products.delete_description(kind)?;
    Ok(status_ok())
}
