//! Embedded static assets.

use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::RustEmbed;

use crate::error::AppError;
use crate::AppState;

#[derive(RustEmbed)]
#[folder = "web/static"]
struct Assets;

/// Static asset routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/static/*path", get(serve_static))
}

/// Serve an embedded static file.
async fn serve_static(Path(path): Path<String>) -> Result<Response, AppError> {
    let path = path.trim_start_matches('/');
    let content = Assets::get(path).ok_or(AppError::NotFound)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        Body::from(content.data.into_owned()),
    )
        .into_response())
}
