use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::response::{ApiError, status_ok};
use crate::types::SocialLinks;

pub async fn get_links(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.users.social_links()?))
}

pub async fn update_links(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SocialLinks>,
) -> Result<impl IntoResponse, ApiError> {
    let links = SocialLinks {
        telegram_link: req.telegram_link.trim().to_string(),
        vk_link: req.vk_link.trim().to_string(),
        wp_link: req.wp_link.trim().to_string(),
    };
    state.users.update_social_links(&links)?;
    Ok(status_ok())
}
