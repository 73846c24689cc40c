mod csrf;
mod middleware;
mod password;
mod session;

pub use csrf::CsrfSigner;
pub use middleware::{OptionalUser, RequireAdmin, RequireUser, csrf_protect};
pub use password::{hash_password, verify_password};
pub use session::{
    ADMIN_COOKIE, CART_COOKIE, USER_COOKIE, admin_session_cookie, cart_cookie, clear_cookie,
    cookie_value, user_session_cookie,
};
