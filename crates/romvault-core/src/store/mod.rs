//! Save stores.
//!
//! A [`SaveStore`] persists at most one save per identity triple. Every write
//! goes through the backend's atomic `INSERT … ON CONFLICT DO UPDATE`, which is
//! the only synchronization point between concurrent writers.

mod config;
mod postgres;
mod sqlite;

pub use config::{Backend, StoreConfig};
pub use postgres::PostgresSaveStore;
pub use sqlite::SqliteSaveStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::record::{SaveId, SaveKey, SaveMeta};

/// Durable CRUD over saves.
#[async_trait]
pub trait SaveStore: Send + Sync {
    /// Backend name, for logs and health reports.
    fn backend(&self) -> &'static str;

    /// Create the `saves` table and its indexes if they do not exist.
    async fn ensure_schema(&self) -> Result<()>;

    /// Check connectivity.
    async fn health_check(&self) -> Result<()>;

    /// List save metadata for a game, most recently updated first.
    async fn list_by_game(&self, game: &str) -> Result<Vec<SaveMeta>>;

    /// Fetch the payload stored under `key`.
    async fn get_data(&self, key: &SaveKey) -> Result<Vec<u8>>;

    /// Insert or atomically replace the payload stored under `key`.
    async fn upsert(&self, key: &SaveKey, data: &[u8]) -> Result<()>;

    /// Remove the save with the given id. Missing ids are not an error.
    async fn delete(&self, id: SaveId) -> Result<()>;
}

/// Open the store selected by the configuration URL and verify connectivity.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn SaveStore>> {
    if config.max_connections == 0 {
        return Err(Error::Config("max_connections must be at least 1".into()));
    }
    if config.min_connections > config.max_connections {
        return Err(Error::Config(
            "min_connections cannot exceed max_connections".into(),
        ));
    }

    let store: Arc<dyn SaveStore> = match config.backend() {
        Some(Backend::Postgres) => Arc::new(PostgresSaveStore::connect(config).await?),
        Some(Backend::Sqlite) => Arc::new(SqliteSaveStore::connect(config).await?),
        None => {
            return Err(Error::Config(format!(
                "unsupported database url scheme in {:?}",
                redact(&config.url)
            )))
        }
    };

    store.health_check().await?;
    tracing::info!(backend = store.backend(), "Connected to save store");
    Ok(store)
}

/// Strip credentials from a connection URL before logging it.
pub(crate) fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
