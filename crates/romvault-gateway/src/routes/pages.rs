//! HTML page routes.

use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Router,
};

use crate::AppState;

/// Page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/play/:rom", get(play))
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let roms = state.roms.scan().await;
    Html(state.pages.index(&roms))
}

async fn play(State(state): State<AppState>, Path(rom): Path<String>) -> Html<String> {
    Html(state.pages.play(&rom))
}
