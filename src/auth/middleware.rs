use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{Method, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::{ADMIN_COOKIE, USER_COOKIE, cookie_value};
use crate::server::AppState;
use crate::types::User;

const LOGIN_PAGE: &str = "/admin/login";

const CSRF_BODY_LIMIT: usize = 1024 * 1024;

/// Extractor for admin-gated routes. The cookie only names a login; whether
/// that login is still an admin is re-checked against the user store on every
/// request. Failure redirects to the login page, HTML and API routes alike.
pub struct RequireAdmin(pub String);

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match admin_login(&parts.headers, state) {
            Some(login) => Ok(RequireAdmin(login)),
            None => Err(Redirect::to(LOGIN_PAGE).into_response()),
        }
    }
}

/// Extractor for `/api/me` and friends: a valid public user session or 401.
pub struct RequireUser(pub User);

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || (StatusCode::UNAUTHORIZED, "unauthorized").into_response();

        let login = cookie_value(&parts.headers, USER_COOKIE)
            .filter(|l| !l.is_empty())
            .ok_or_else(unauthorized)?;
        let user = state
            .users
            .get_by_login(&login)
            .map_err(|_| unauthorized())?
            .ok_or_else(unauthorized)?;
        Ok(RequireUser(user))
    }
}

/// The login carried by the public user session cookie, if any. Never
/// rejects; order handlers use it to enrich rows for logged-in visitors.
pub struct OptionalUser(pub Option<String>);

impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(
            cookie_value(&parts.headers, USER_COOKIE).filter(|l| !l.is_empty()),
        ))
    }
}

fn admin_login(headers: &axum::http::HeaderMap, state: &AppState) -> Option<String> {
    let login = cookie_value(headers, ADMIN_COOKIE)?;
    if login.is_empty() {
        return None;
    }
    state
        .users
        .is_admin(&login)
        .unwrap_or(false)
        .then_some(login)
}

/// Middleware for state-changing admin APIs: POST/PATCH/DELETE must carry a
/// valid CSRF token, either in the `X-CSRF-Token` header or in a `csrf` form
/// field when the body is form-encoded. Runs before the session check, so a
/// bad token is a 403 even without a session.
pub async fn csrf_protect(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method();
    if method != Method::POST && method != Method::PATCH && method != Method::DELETE {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let mut token = parts
        .headers
        .get("X-CSRF-Token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    // The form path has to buffer the body; hand the bytes back downstream.
    let bytes = match axum::body::to_bytes(body, CSRF_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => return (StatusCode::BAD_REQUEST, "body too large").into_response(),
    };
    if token.is_empty() && is_form_encoded(&parts.headers) {
        token = form_field(&bytes, "csrf").unwrap_or_default();
    }

    if !state.csrf.validate(&token) {
        return (StatusCode::FORBIDDEN, "invalid csrf").into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn is_form_encoded(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

fn form_field(body: &[u8], name: &str) -> Option<String> {
    let body = std::str::from_utf8(body).ok()?;
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| {
            let value = value.replace('+', " ");
            urlencoding::decode(&value)
                .map(|v| v.into_owned())
                .unwrap_or(value)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_field_extraction() {
        assert_eq!(
            form_field(b"login=admin&csrf=1700000000%3Aabcdef", "csrf").as_deref(),
            Some("1700000000:abcdef")
        );
        assert_eq!(form_field(b"login=admin", "csrf"), None);
        assert_eq!(form_field(b"", "csrf"), None);
    }
}
