//! Streams remote images through the server so user-supplied image URLs on
//! news pages do not hit hotlink or CORS walls in the browser.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::server::AppState;
use crate::server::response::ApiError;

const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub u: String,
}

pub async fn image_proxy(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProxyParams>,
) -> Result<Response, ApiError> {
    let url = params.u.trim();
    let lowered = url.to_lowercase();
    if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
        return Err(ApiError::bad_request("invalid url"));
    }

    let upstream = state
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| ApiError::bad_gateway(e.to_string()))?;
    if !upstream.status().is_success() {
        return Err(ApiError::bad_gateway(format!(
            "upstream status {}",
            upstream.status()
        )));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let body = upstream
        .bytes()
        .await
        .map_err(|e| ApiError::bad_gateway(e.to_string()))?;

    let mut response = body.into_response();
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(NO_STORE),
    );
    Ok(response)
}
