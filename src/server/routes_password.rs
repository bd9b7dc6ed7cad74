//! Shared password endpoints.
//!
//! The password is compared by plain equality. Nothing is issued on success;
//! the web UI re-submits the password whenever it needs to unlock.

use super::error::AppError;
use super::AppContext;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use liji_common::DEFAULT_PASSWORD;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub fn password_routes() -> Router<AppContext> {
    Router::new()
        .route("/password", post(set_password))
        .route("/password/status", get(password_status))
        .route("/password/verify", post(verify_password))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStatusResponse {
    /// A non-empty password is stored
    pub has_password: bool,
    /// The password is still the factory default
    pub is_first_time: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPasswordRequest {
    /// Current password. Checked only when present and non-empty.
    #[serde(default)]
    pub old_password: Option<String>,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PasswordResponse {
    pub success: bool,
    pub message: String,
}

impl PasswordResponse {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/password/status",
    tag = "password",
    responses(
        (status = 200, description = "Password status", body = PasswordStatusResponse),
        (status = 500, description = "Storage error")
    )
)]
pub async fn password_status(
    State(ctx): State<AppContext>,
) -> Result<Json<PasswordStatusResponse>, AppError> {
    let current = ctx.store.read_password()?;
    Ok(Json(PasswordStatusResponse {
        has_password: !current.is_empty(),
        is_first_time: current == DEFAULT_PASSWORD,
    }))
}

#[utoipa::path(
    post,
    path = "/api/password",
    tag = "password",
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = PasswordResponse),
        (status = 401, description = "Old password does not match", body = PasswordResponse),
        (status = 500, description = "Storage error")
    )
)]
pub async fn set_password(
    State(ctx): State<AppContext>,
    Json(req): Json<SetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(old) = req.old_password.as_deref().filter(|p| !p.is_empty()) {
        let current = ctx.store.read_password()?;
        if current != old {
            tracing::warn!("Password change rejected: old password mismatch");
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(PasswordResponse::rejected("Old password is incorrect")),
            ));
        }
    }

    ctx.store.write_password(&req.new_password)?;
    tracing::info!("Password updated");

    Ok((StatusCode::OK, Json(PasswordResponse::ok("Password updated"))))
}

#[utoipa::path(
    post,
    path = "/api/password/verify",
    tag = "password",
    request_body = VerifyPasswordRequest,
    responses(
        (status = 200, description = "Password accepted", body = PasswordResponse),
        (status = 401, description = "Password rejected", body = PasswordResponse),
        (status = 500, description = "Storage error")
    )
)]
pub async fn verify_password(
    State(ctx): State<AppContext>,
    Json(req): Json<VerifyPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let current = ctx.store.read_password()?;

    if current == req.password {
        Ok((StatusCode::OK, Json(PasswordResponse::ok("Password verified"))))
    } else {
        tracing::debug!("Password verification failed");
        Ok((
            StatusCode::UNAUTHORIZED,
            Json(PasswordResponse::rejected("Incorrect password")),
        ))
    }
}
