//! Cookie plumbing for the three session kinds: short-lived admin sessions,
//! week-long public user sessions and the anonymous cart id.
//!
//! Session cookies carry the URL-escaped login and nothing else; trust is
//! re-derived on every request by looking the login up in the user store.

use axum::http::{HeaderMap, header};

pub const ADMIN_COOKIE: &str = "admin_session";
pub const USER_COOKIE: &str = "user_session";
pub const CART_COOKIE: &str = "cart_id";

const ADMIN_TTL_SECS: i64 = 30 * 60;
const USER_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const CART_TTL_SECS: i64 = 90 * 24 * 60 * 60;

#[must_use]
pub fn admin_session_cookie(login: &str) -> String {
    session_cookie(ADMIN_COOKIE, login, ADMIN_TTL_SECS)
}

#[must_use]
pub fn user_session_cookie(login: &str) -> String {
    session_cookie(USER_COOKIE, login, USER_TTL_SECS)
}

#[must_use]
pub fn cart_cookie(cart_id: &str) -> String {
    format!("{CART_COOKIE}={cart_id}; Path=/; Max-Age={CART_TTL_SECS}; SameSite=Lax")
}

#[must_use]
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

fn session_cookie(name: &str, login: &str, max_age: i64) -> String {
    format!(
        "{name}={}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax",
        urlencoding::encode(login)
    )
}

/// Extracts and URL-unescapes a cookie value from the request headers.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    #[test]
    fn test_cookie_roundtrip() {
        let cookie = user_session_cookie("user@example.com");
        assert!(cookie.starts_with("user_session=user%40example.com;"));

        let headers = headers_with_cookie("user_session=user%40example.com; other=1");
        assert_eq!(
            cookie_value(&headers, USER_COOKIE).as_deref(),
            Some("user@example.com")
        );
        assert_eq!(cookie_value(&headers, "other").as_deref(), Some("1"));
        assert_eq!(cookie_value(&headers, ADMIN_COOKIE), None);
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        assert!(clear_cookie(ADMIN_COOKIE).contains("Max-Age=0"));
    }
}
