//! Catalog domain: the static category/product tables shipped with the site
//! and the sub-category matching heuristics used to filter free-text rows.

mod classify;
mod legacy;

pub use classify::{
    legacy_title_matches, matches_subcategory, normalize_ascii, normalize_label, sort_for_listing,
};
pub use legacy::{
    CATEGORIES, LEGACY_PRODUCTS, category_to_type_slug, catalog_title, normalize_type_slug,
};
