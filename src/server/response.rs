use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::Error;

/// API error rendered as a plain-text body. Storage failures surface the raw
/// error string; this service is deliberately not hardened against leaking
/// them.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound => Self::not_found("not found"),
            Error::AlreadyExists => Self::conflict("already exists"),
            Error::BadRequest(message) => Self::bad_request(message),
            other => Self::internal(other.to_string()),
        }
    }
}

/// The `{"status":"ok"}` acknowledgement most mutating endpoints reply with.
#[must_use]
pub fn status_ok() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Acknowledgement carrying the id of a freshly inserted row.
#[must_use]
pub fn created_ok(id: i64) -> Json<serde_json::Value> {
    Json(json!({ "id": id, "status": "ok" }))
}
