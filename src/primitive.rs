//! Primitives and essential dependencies

use std::fmt::{Display, Formatter};

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

// Reexport or redefine types.

/// Anyhow error
pub use anyhow;

/// Tracing
pub use tracing;

/// What the client is told when a required query parameter is absent.
pub const MSG_MISSING_PARAM: &str = "Required parameter wasn't provided";

/// What the client is told when the target box is not usable.
pub const MSG_BAD_DIMENSIONS: &str =
    "width and height parameters should be positive integers";

/// What the client is told when the source could not be retrieved.
pub const MSG_INACCESSIBLE: &str = "URL argument isn't accessible";

/// What the client is told when the source is not an image we can read.
pub const MSG_UNDECODABLE: &str =
    "URL argument isn't a link to processable image";

/// What the client is told about anything we did not anticipate.
pub const MSG_INTERNAL: &str =
    "An error occurred while processing your request";

/// Unified error type for the thumbnail endpoint.
///
/// The first two variants carry a fixed, client-facing message. The last
/// one carries the real cause, which is strictly internal: the client
/// only ever sees [`MSG_INTERNAL`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(&'static str),
    /// 422 Unprocessable Entity
    Unprocessable(&'static str),
    /// 500 Internal Server Error
    Internal(
        #[from]
        #[source]
        anyhow::Error,
    ),
}

impl ApiError {
    /// HTTP status for this outcome.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to send to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(msg) | ApiError::Unprocessable(msg) => msg,
            ApiError::Internal(_) => MSG_INTERNAL,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            ApiError::Unprocessable(msg) => write!(f, "Unprocessable: {msg}"),
            ApiError::Internal(e) => write!(f, "Internal server error: {e}"),
        }
    }
}

/// The `{"error": {"message": ...}}` body shared by every failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: ErrorMessage<'a>,
}

#[derive(Debug, Serialize)]
pub struct ErrorMessage<'a> {
    pub message: &'a str,
}

impl<'a> ErrorBody<'a> {
    pub fn new(message: &'a str) -> Self {
        Self {
            error: ErrorMessage { message },
        }
    }
}

/// Render an [`ErrorBody`] with the given status.
pub fn error_body(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

impl IntoResponse for ApiError {
    /// Render as JSON. Internal details never leave the server; they are
    /// logged here with the full chain and backtrace.
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(ref e) = self {
            tracing::error!("Unexpected error while making thumbnail: {e:?}");
        }
        error_body(self.status(), self.public_message())
    }
}

/// Unified Result. You can return this type directly in an
/// Axum endpoint handler.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_body_shape() {
        let value = serde_json::to_value(ErrorBody::new(MSG_INACCESSIBLE)).unwrap();
        assert_eq!(value, json!({ "error": { "message": MSG_INACCESSIBLE } }));
    }

    #[test]
    fn internal_errors_stay_private() {
        let err = ApiError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), MSG_INTERNAL);
        let err = ApiError::Unprocessable(MSG_UNDECODABLE);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.public_message(), MSG_UNDECODABLE);
    }
}
