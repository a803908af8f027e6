//! PostgreSQL save store.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use super::{SaveStore, StoreConfig};
use crate::error::{Error, Result};
use crate::record::{SaveId, SaveKey, SaveMeta};

/// Advisory lock key serializing schema provisioning across processes.
const SCHEMA_LOCK_KEY: i64 = 0x726f_6d76_6175_6c74;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS saves (
        id         SERIAL PRIMARY KEY,
        rom_name   TEXT NOT NULL,
        save_type  TEXT NOT NULL DEFAULT 'sram',
        slot       INT NOT NULL DEFAULT 0,
        data       BYTEA NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (rom_name, save_type, slot)
    )
"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_saves_rom_updated ON saves (rom_name, updated_at DESC)";

/// PostgreSQL-backed save store.
pub struct PostgresSaveStore {
    pool: PgPool,
}

impl PostgresSaveStore {
    /// Open a connection pool for the configured URL.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let opts = PgConnectOptions::from_str(&config.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(opts)
            .await?;

        tracing::debug!(
            max_connections = config.max_connections,
            acquire_timeout_ms = config.acquire_timeout.as_millis() as u64,
            "Opened PostgreSQL pool"
        );
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn meta_from_row(row: &PgRow) -> std::result::Result<SaveMeta, sqlx::Error> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(SaveMeta {
        id: SaveId(row.try_get("id")?),
        key: SaveKey {
            game: row.try_get("rom_name")?,
            save_type: row.try_get("save_type")?,
            slot: row.try_get("slot")?,
        },
        size: row.try_get("size")?,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl SaveStore for PostgresSaveStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ensure_schema(&self) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Schema)?;

        // Concurrent CREATE TABLE IF NOT EXISTS can still race on the catalog.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(Error::Schema)?;
        sqlx::query(CREATE_TABLE)
            .execute(&mut *tx)
            .await
            .map_err(Error::Schema)?;
        sqlx::query(CREATE_INDEX)
            .execute(&mut *tx)
            .await
            .map_err(Error::Schema)?;

        tx.commit().await.map_err(Error::Schema)?;
        tracing::info!("Save schema ready (postgres)");
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_by_game(&self, game: &str) -> Result<Vec<SaveMeta>> {
        let rows = sqlx::query(
            r#"
            SELECT id::BIGINT AS id, rom_name, save_type, slot,
                   length(data)::BIGINT AS size, created_at, updated_at
            FROM saves
            WHERE rom_name = $1
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(game)
        .fetch_all(&self.pool)
        .await?;

        let saves = rows
            .iter()
            .map(meta_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!(game, count = saves.len(), "Listed saves");
        Ok(saves)
    }

    async fn get_data(&self, key: &SaveKey) -> Result<Vec<u8>> {
        let data: Option<Vec<u8>> = sqlx::query_scalar(
            "SELECT data FROM saves WHERE rom_name = $1 AND save_type = $2 AND slot = $3",
        )
        .bind(&key.game)
        .bind(&key.save_type)
        .bind(key.slot)
        .fetch_optional(&self.pool)
        .await?;

        data.ok_or(Error::NotFound)
    }

    async fn upsert(&self, key: &SaveKey, data: &[u8]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO saves (rom_name, save_type, slot, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (rom_name, save_type, slot)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(&key.game)
        .bind(&key.save_type)
        .bind(key.slot)
        .bind(data)
        .execute(&self.pool)
        .await?;

        tracing::debug!(%key, size = data.len(), "Upserted save");
        Ok(())
    }

    async fn delete(&self, id: SaveId) -> Result<()> {
        let result = sqlx::query("DELETE FROM saves WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        tracing::debug!(%id, removed = result.rows_affected(), "Deleted save");
        Ok(())
    }
}
