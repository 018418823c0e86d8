use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{auth::AuthError, repository::StoreError};

/// ApiError
///
/// The complete failure taxonomy of the HTTP surface. Every handler and extractor
/// rejection funnels through this enum so the wire contract stays in one place:
///
/// | Variant        | Status | Body                                   |
/// |----------------|--------|----------------------------------------|
/// | `Unauthorized` | 401    | `{"message":"unauthorized access"}`    |
/// | `Forbidden`    | 403    | `{"message":"forbidden access"}`       |
/// | `BadId`        | 400    | `{"message":"invalid id"}`             |
/// | `Store`        | 500    | `{"message":"internal server error"}`  |
///
/// `Unauthorized` covers the missing, malformed, and expired token cases alike;
/// `Forbidden` is reserved for a valid session asserting someone else's identity.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized access")]
    Unauthorized,

    #[error("forbidden access")]
    Forbidden,

    /// A route identifier that does not parse as a UUID. Surfaced as a client
    /// error instead of letting the store reject it as a server failure.
    #[error("invalid id: {0}")]
    BadId(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// Token codec failures collapse into 401 at the HTTP layer; the distinction
// between Invalid and Expired only matters to callers of the codec itself.
impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Unauthorized
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized access"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden access"),
            ApiError::BadId(raw) => {
                tracing::debug!(id = %raw, "rejected malformed identifier");
                (StatusCode::BAD_REQUEST, "invalid id")
            }
            ApiError::Store(e) => {
                // The underlying store error is logged for operators and never
                // included in the response body.
                tracing::error!("store failure: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
