use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Store failure messages are truncated before leaving the process so a
/// connection string or driver internals never reach a client verbatim.
const STORE_DETAIL_LIMIT: usize = 120;

/// ApiError
///
/// The full error taxonomy of the HTTP layer. Every handler returns
/// `Result<_, ApiError>`; the `IntoResponse` impl below is the single place
/// where errors are mapped to status codes and the `{"detail": ...}` wire
/// shape clients rely on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed id, missing required field, or out-of-range value. 400.
    #[error("{0}")]
    Validation(String),
    /// Missing/invalid token or bad login credentials. 401.
    #[error("{0}")]
    Unauthorized(&'static str),
    /// The requested record does not exist. 404.
    #[error("{0}")]
    NotFound(&'static str),
    /// The document store failed. 500, with a sanitized message.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, (*message).to_string())
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, (*message).to_string()),
            ApiError::Store(error) => {
                // Full detail goes to the logs; the client gets a capped message.
                tracing::error!("store failure: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error.to_string().chars().take(STORE_DETAIL_LIMIT).collect(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
