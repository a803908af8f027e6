//! ROM library endpoints.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::error::AppError;
use crate::roms::RomEntry;
use crate::AppState;

/// ROM routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/roms", get(list_roms))
        .route("/api/roms/:name", get(serve_rom))
}

/// List the ROM library.
async fn list_roms(State(state): State<AppState>) -> Json<Vec<RomEntry>> {
    Json(state.roms.scan().await)
}

/// Serve a ROM file's raw bytes.
async fn serve_rom(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state
        .roms
        .read(&name)
        .await
        .map_err(|e| AppError::Internal(format!("reading ROM failed: {e}")))?
        .ok_or(AppError::NotFound)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        Body::from(bytes),
    )
        .into_response())
}
