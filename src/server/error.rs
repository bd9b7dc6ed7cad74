//! Error-to-HTTP response conversion.
//!
//! Handlers return `Result<T, AppError>` and use `?` on storage calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for [`liji_common::Error`].
#[derive(Debug)]
pub struct AppError(liji_common::Error);

impl AppError {
    pub fn new(inner: liji_common::Error) -> Self {
        Self(inner)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<liji_common::Error> for AppError {
    fn from(e: liji_common::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.0,
                "Server error in API handler"
            );
        }

        let body = json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
