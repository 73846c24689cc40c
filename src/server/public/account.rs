//! Public registration and login. The login is collapsed to whichever of
//! email/phone the visitor supplied; sessions are week-long cookies.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{
    RequireUser, USER_COOKIE, clear_cookie, hash_password, user_session_cookie, verify_password,
};
use crate::error::Error;
use crate::server::AppState;
use crate::server::response::{ApiError, status_ok};

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let email = req.email.trim();
    let phone = req.phone.trim();
    let login = if !email.is_empty() { email } else { phone };
    if login.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email or phone and password required"));
    }

    let hash = hash_password(&req.password)?;
    match state.users.create(login, &hash, email, phone, false) {
        Ok(_) => {}
        Err(Error::AlreadyExists) => return Err(ApiError::conflict("user already exists")),
        Err(e) => return Err(e.into()),
    }

    Ok(with_cookie(
        status_ok().into_response(),
        &user_session_cookie(login),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = req.email.trim();
    let identifier = if !email.is_empty() { email } else { req.phone.trim() };
    if identifier.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("credentials required"));
    }

    let user = state
        .users
        .get_by_login(identifier)?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    Ok(with_cookie(
        status_ok().into_response(),
        &user_session_cookie(&user.login),
    ))
}

pub async fn logout() -> Response {
    with_cookie(status_ok().into_response(), &clear_cookie(USER_COOKIE))
}

pub async fn me(RequireUser(user): RequireUser) -> impl IntoResponse {
    Json(json!({
        "login": user.login,
        "email": user.email,
        "phone": user.phone,
    }))
}
