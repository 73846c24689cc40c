//! Server-rendered HTML surface. Pages are plain files under `front/HTML/`
//! with `{{PLACEHOLDER}}` tokens substituted before sending; everything else
//! about their markup belongs to the front-end.

use std::fs;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    Form, Router,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::auth::{
    ADMIN_COOKIE, RequireAdmin, admin_session_cookie, clear_cookie, verify_password,
};
use crate::server::AppState;
use crate::server::response::ApiError;

const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";

pub fn pages_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/login", get(login_page).post(login_submit))
        .route("/admin/logout", get(logout))
        .route("/admin/", get(admin_home))
        .route("/catalog", get(catalog_index))
        .route("/catalog/", get(catalog_index))
        .route("/catalog/{*path}", get(catalog_page))
        .route("/cabinet/", get(cabinet_page))
        .route("/cart/", get(cart_page))
        .route("/back/news/{id}", get(news_page))
}

fn render_template(
    path: &FsPath,
    replacements: &[(&str, &str)],
) -> Result<Html<String>, ApiError> {
    let mut html = fs::read_to_string(path).map_err(|_| ApiError::not_found("not found"))?;
    for (token, value) in replacements {
        html = html.replace(token, value);
    }
    Ok(Html(html))
}

fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn html_dir(state: &AppState) -> std::path::PathBuf {
    state.front_dir.join("HTML")
}

// --- admin pages ---

async fn login_page(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let html = render_template(
        &html_dir(&state).join("admin_login.html"),
        &[("{{CSRF_TOKEN}}", &state.csrf.generate())],
    )?;
    Ok(html.into_response())
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    csrf: String,
    #[serde(default)]
    login: String,
    #[serde(default)]
    password: String,
}

async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.csrf.validate(&form.csrf) {
        return (StatusCode::FORBIDDEN, "invalid csrf").into_response();
    }

    let login = form.login.trim();
    let Ok(Some(user)) = state.users.get_by_login(login) else {
        return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
    };
    if !verify_password(&form.password, &user.password_hash) {
        return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
    }

    let mut response = Redirect::to("/admin/").into_response();
    // Non-admins get redirected without a session and bounce back to login
    if user.is_admin {
        if let Ok(value) = HeaderValue::from_str(&admin_session_cookie(&user.login)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

async fn logout() -> Response {
    let mut response = Redirect::to("/admin/login").into_response();
    if let Ok(value) = HeaderValue::from_str(&clear_cookie(ADMIN_COOKIE)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

async fn admin_home(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let html = render_template(
        &html_dir(&state).join("admin.html"),
        &[("{{CSRF_TOKEN}}", &state.csrf.generate())],
    )?;
    Ok(html.into_response())
}

/// Serves `/front/...`. The admin panel's HTML is session-gated even when
/// fetched by its file path, the login file bounces to the canonical login
/// route, everything else is plain file serving.
pub async fn serve_front(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    match request.uri().path() {
        "/front/HTML/admin_login.html" => Redirect::to("/admin/login").into_response(),
        "/front/HTML/admin.html" => {
            let is_admin = crate::auth::cookie_value(request.headers(), ADMIN_COOKIE)
                .filter(|l| !l.is_empty())
                .map(|l| state.users.is_admin(&l).unwrap_or(false))
                .unwrap_or(false);
            if !is_admin {
                return Redirect::to("/admin/login").into_response();
            }
            match render_template(
                &html_dir(&state).join("admin.html"),
                &[("{{CSRF_TOKEN}}", &state.csrf.generate())],
            ) {
                Ok(html) => html.into_response(),
                Err(e) => e.into_response(),
            }
        }
        path => {
            // Re-root the (still percent-encoded) path below the front dir
            let stripped = path.strip_prefix("/front").unwrap_or(path);
            let Ok(uri) = Uri::try_from(stripped) else {
                return StatusCode::NOT_FOUND.into_response();
            };
            let mut file_request = Request::new(Body::empty());
            *file_request.uri_mut() = uri;
            match ServeDir::new(&state.front_dir).oneshot(file_request).await {
                Ok(response) => response.into_response(),
                Err(err) => match err {},
            }
        }
    }
}

// --- catalog pages ---

async fn catalog_index(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let html = render_template(&html_dir(&state).join("catalog.html"), &[])?;
    Ok(no_store(html.into_response()))
}

async fn catalog_page(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let parts: Vec<&str> = path.trim_matches('/').split('/').filter(|p| !p.is_empty()).collect();

    // Deep product routes render the item page; the script resolves the rest
    if parts.len() >= 3 {
        let html = render_template(&html_dir(&state).join("catalog_item.html"), &[])?;
        return Ok(no_store(html.into_response()));
    }

    let Some(&slug) = parts.first() else {
        return Err(ApiError::not_found("not found"));
    };
    let sub = parts.get(1).copied().unwrap_or("");
    let Some(title) = crate::catalog::catalog_title(slug) else {
        return Err(ApiError::not_found("not found"));
    };

    let html = render_template(
        &html_dir(&state).join("catalog_list.html"),
        &[
            ("{{CATEGORY_TITLE}}", title),
            ("{{CATEGORY_SLUG}}", slug),
            ("{{SUBCATEGORY_SLUG}}", sub),
        ],
    )?;
    Ok(no_store(html.into_response()))
}

// --- visitor pages ---

async fn cabinet_page(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let html = render_template(&html_dir(&state).join("cabinet.html"), &[])?;
    Ok(no_store(html.into_response()))
}

async fn cart_page(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let html = render_template(&html_dir(&state).join("cart.html"), &[])?;
    Ok(no_store(html.into_response()))
}

async fn news_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    if id <= 0 {
        return Err(ApiError::bad_request("invalid id"));
    }
    let entry = state
        .news
        .get(id)?
        .ok_or_else(|| ApiError::not_found("not found"))?;

    // External images go through the proxy to dodge hotlink protection
    let img = entry.image_url.trim();
    let img = if img.to_lowercase().starts_with("http://")
        || img.to_lowercase().starts_with("https://")
    {
        format!("/api/image-proxy?u={}", urlencoding::encode(img))
    } else {
        img.to_string()
    };
    let img_html = if img.is_empty() {
        String::new()
    } else {
        format!("<img src=\"{img}\" alt=\"\" />")
    };

    let html = render_template(
        &html_dir(&state).join("news_item.html"),
        &[
            ("{{NEWS_TITLE}}", escape_html(&entry.title).as_str()),
            ("{{NEWS_DATE}}", escape_html(&entry.published_at).as_str()),
            ("{{NEWS_IMAGE}}", img_html.as_str()),
            ("{{NEWS_BODY}}", entry.full_text.as_str()),
        ],
    )?;
    Ok(no_store(html.into_response()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b> & \"c\""), "a&lt;b&gt; &amp; &quot;c&quot;");
    }
}
