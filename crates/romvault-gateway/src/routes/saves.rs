//! Cloud save endpoints.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    routing::{delete, get},
    Json, Router,
};

use crate::error::AppError;
use crate::json::{ReadSaveParams, SaveDataJson, SaveJson, StatusResponse, WriteSaveRequest};
use crate::AppState;

/// Save routes. Request bodies may be up to `max_body_bytes` long.
pub fn routes(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/saves/:rom", get(list_saves).post(write_save))
        .route("/api/saves/:rom/data", get(read_save))
        .route("/api/saves/:rom/:id", delete(delete_save))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// List save metadata for a ROM.
async fn list_saves(
    State(state): State<AppState>,
    Path(rom): Path<String>,
) -> Result<Json<Vec<SaveJson>>, AppError> {
    let saves = state.saves.list_saves(&rom).await?;
    Ok(Json(saves.into_iter().map(SaveJson::from).collect()))
}

/// Fetch one save payload as base64.
async fn read_save(
    State(state): State<AppState>,
    Path(rom): Path<String>,
    Query(params): Query<ReadSaveParams>,
) -> Result<Json<SaveDataJson>, AppError> {
    let data = state
        .saves
        .read_save(&rom, params.save_type.as_deref(), params.slot.as_deref())
        .await?;
    Ok(Json(SaveDataJson { data }))
}

/// Create or overwrite a save.
async fn write_save(
    State(state): State<AppState>,
    Path(rom): Path<String>,
    body: Result<Json<WriteSaveRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(request) = body?;
    state
        .saves
        .write_save(&rom, &request.data, request.save_type.as_deref(), request.slot)
        .await?;

    tracing::info!(
        rom = %rom,
        save_type = ?request.save_type,
        slot = ?request.slot,
        "Save written"
    );
    Ok(Json(StatusResponse::ok()))
}

/// Delete a save by id. The ROM segment only scopes the URL.
async fn delete_save(
    State(state): State<AppState>,
    Path((rom, id)): Path<(String, String)>,
) -> Result<Json<StatusResponse>, AppError> {
    state.saves.delete_save(&id).await?;

    tracing::info!(rom = %rom, id = %id, "Save deleted");
    Ok(Json(StatusResponse::ok()))
}
