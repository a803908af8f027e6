//! romvault HTTP gateway.
//!
//! Serves the ROM library, the player pages and the cloud save API backed by
//! [`romvault_core::SaveService`].

pub mod config;
pub mod error;
pub mod json;
pub mod pages;
pub mod roms;
pub mod routes;

pub use config::{Args, GatewayConfig};
pub use error::AppError;
pub use pages::Pages;
pub use roms::RomLibrary;

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Router;
use romvault_core::SaveService;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::predicate::{NotForContentType, Predicate};
use tower_http::compression::{CompressionLayer, DefaultPredicate};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Save operations.
    pub saves: Arc<SaveService>,
    /// ROM directory.
    pub roms: Arc<RomLibrary>,
    /// Page templates, loaded once at startup.
    pub pages: Arc<Pages>,
    /// Gateway configuration. Read when the router is built.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(saves: SaveService, roms: RomLibrary, pages: Pages, config: GatewayConfig) -> Self {
        Self {
            saves: Arc::new(saves),
            roms: Arc::new(roms),
            pages: Arc::new(pages),
            config,
        }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(routes::health::routes())
        .merge(routes::pages::routes())
        .merge(routes::roms::routes())
        .merge(routes::saves::routes(state.config.max_body_bytes))
        .merge(routes::static_files::routes());

    with_middleware(router).with_state(state)
}

/// Middleware stack applied to every route.
fn with_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ROM images are served raw.
    let compression = CompressionLayer::new().compress_when(
        DefaultPredicate::new().and(NotForContentType::const_new("application/octet-stream")),
    );

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(compression)
            .layer(cors),
    )
}

fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Handler panicked");
    AppError::Internal("internal error".to_string()).into_response()
}
