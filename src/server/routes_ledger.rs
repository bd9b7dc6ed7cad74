//! Records and giftbooks endpoints.
//!
//! POST bodies carry the complete collection; the store makes persisted state
//! match it exactly.

use super::error::AppError;
use super::AppContext;
use axum::{extract::State, routing::get, Json, Router};
use liji_db::models::{Giftbook, GiftbookInput, Record, RecordInput};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub fn ledger_routes() -> Router<AppContext> {
    Router::new()
        .route("/records", get(list_records).post(save_records))
        .route("/giftbooks", get(list_giftbooks).post(save_giftbooks))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveResponse {
    pub success: bool,
}

#[utoipa::path(
    get,
    path = "/api/records",
    tag = "records",
    responses(
        (status = 200, description = "All records", body = Vec<Record>),
        (status = 500, description = "Storage error")
    )
)]
pub async fn list_records(State(ctx): State<AppContext>) -> Result<Json<Vec<Record>>, AppError> {
    Ok(Json(ctx.store.list_records()?))
}

#[utoipa::path(
    post,
    path = "/api/records",
    tag = "records",
    request_body = Vec<RecordInput>,
    responses(
        (status = 200, description = "Records replaced", body = SaveResponse),
        (status = 500, description = "Storage error, nothing was changed")
    )
)]
pub async fn save_records(
    State(ctx): State<AppContext>,
    Json(records): Json<Vec<RecordInput>>,
) -> Result<Json<SaveResponse>, AppError> {
    let summary = ctx.store.save_records(&records)?;
    tracing::info!(
        backend = %ctx.store.backend(),
        inserted = summary.inserted,
        updated = summary.updated,
        deleted = summary.deleted,
        "Saved records"
    );
    Ok(Json(SaveResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/giftbooks",
    tag = "giftbooks",
    responses(
        (status = 200, description = "All giftbooks with their items", body = Vec<Giftbook>),
        (status = 500, description = "Storage error")
    )
)]
pub async fn list_giftbooks(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<Giftbook>>, AppError> {
    Ok(Json(ctx.store.list_giftbooks()?))
}

#[utoipa::path(
    post,
    path = "/api/giftbooks",
    tag = "giftbooks",
    request_body = Vec<GiftbookInput>,
    responses(
        (status = 200, description = "Giftbooks replaced", body = SaveResponse),
        (status = 500, description = "Storage error, nothing was changed")
    )
)]
pub async fn save_giftbooks(
    State(ctx): State<AppContext>,
    Json(giftbooks): Json<Vec<GiftbookInput>>,
) -> Result<Json<SaveResponse>, AppError> {
    let summary = ctx.store.save_giftbooks(&giftbooks)?;
    tracing::info!(
        backend = %ctx.store.backend(),
        inserted = summary.inserted,
        updated = summary.updated,
        deleted = summary.deleted,
        "Saved giftbooks"
    );
    Ok(Json(SaveResponse { success: true }))
}
