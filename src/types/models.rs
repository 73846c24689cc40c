use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account. `login` collapses to whichever of email/phone the
/// visitor signed up with; the bootstrap admin is seeded as `admin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    #[serde(skip)]
    pub password_hash: String,
    pub email: String,
    pub phone: String,
    pub is_admin: bool,
}

/// Database-backed product row. The table grew columns over time, so every
/// field past the legacy set reads back a zero value for old rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub size: String,
    pub subtype: String,
    pub img: String,
    pub price: f64,
    pub price_per_ton: f64,
    pub thickness_mm: f64,
    pub weight_kg: f64,
    pub length_m: f64,
    pub in_stock: bool,
    pub featured: bool,
    pub sku: String,
    pub created_at: String,
}

/// Per-category description shown on catalog pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescription {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

/// Service request submitted from the services page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub service: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// One-click / cart checkout order for a concrete item.
/// `total` is computed once at write time and never re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOrder {
    pub id: i64,
    pub item_id: String,
    pub title: String,
    pub qty: i64,
    pub price: f64,
    pub total: f64,
    pub phone: String,
    pub user_login: String,
    pub status: String,
    pub created_at: String,
}

/// Cart line for an anonymous cookie-identified visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub image: String,
    pub qty: i64,
}

/// News or article entry; both tables share this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: i64,
    pub title: String,
    pub short_text: String,
    pub full_text: String,
    /// YYYY-MM-DD
    pub published_at: String,
    pub image_url: String,
}

/// Singleton row of social media links shown in the site footer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    pub telegram_link: String,
    pub vk_link: String,
    pub wp_link: String,
}

/// UI catalog category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
}

/// Entry of the built-in fallback catalog used when the products table is
/// still empty.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyProduct {
    pub id: &'static str,
    pub title: &'static str,
    pub image: &'static str,
    #[serde(rename = "categoryId")]
    pub category_id: &'static str,
    pub description: &'static str,
}
