//! SQLite save store, for embedded deployments and tests.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::{SaveStore, StoreConfig};
use crate::error::{Error, Result};
use crate::record::{SaveId, SaveKey, SaveMeta};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS saves (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        rom_name   TEXT NOT NULL,
        save_type  TEXT NOT NULL DEFAULT 'sram',
        slot       INTEGER NOT NULL DEFAULT 0,
        data       BLOB NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE (rom_name, save_type, slot)
    )
"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_saves_rom_updated ON saves (rom_name, updated_at DESC)";

/// SQLite-backed save store.
///
/// Writers are serialized by SQLite itself; a busy timeout makes concurrent
/// writers wait for the lock instead of failing.
pub struct SqliteSaveStore {
    pool: SqlitePool,
}

impl SqliteSaveStore {
    /// Open (creating if missing) the database named by the configured URL.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let mut opts = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let mut pool_opts = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);

        if config.is_sqlite_memory() {
            // Every connection to `:memory:` is a separate database, so keep
            // exactly one alive for the lifetime of the pool.
            pool_opts = pool_opts
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            opts = opts.journal_mode(SqliteJournalMode::Wal);
            pool_opts = pool_opts
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .idle_timeout(config.idle_timeout);
        }

        let pool = pool_opts.connect_with(opts).await?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn meta_from_row(row: &SqliteRow) -> std::result::Result<SaveMeta, sqlx::Error> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(SaveMeta {
        id: SaveId(row.try_get("id")?),
        key: SaveKey {
            game: row.try_get("rom_name")?,
            save_type: row.try_get("save_type")?,
            slot: row.try_get("slot")?,
        },
        size: row.try_get("size")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl SaveStore for SqliteSaveStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(Error::Schema)?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(Error::Schema)?;

        tracing::info!("Save schema ready (sqlite)");
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_by_game(&self, game: &str) -> Result<Vec<SaveMeta>> {
        let rows = sqlx::query(
            r#"
            SELECT id, rom_name, save_type, slot, length(data) AS size, created_at, updated_at
            FROM saves
            WHERE rom_name = ?1
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
            "SELECT data FROM saves WHERE rom_name = ?1 AND save_type = ?2 AND slot = ?3",
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
            INSERT INTO saves (rom_name, save_type, slot, data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (rom_name, save_type, slot)
            DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(&key.game)
        .bind(&key.save_type)
        .bind(key.slot)
        .bind(data)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        tracing::debug!(%key, size = data.len(), "Upserted save");
        Ok(())
    }

    async fn delete(&self, id: SaveId) -> Result<()> {
        let result = sqlx::query("DELETE FROM saves WHERE id = ?1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        tracing::debug!(%id, removed = result.rows_affected(), "Deleted save");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&timestamp(now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_parses_column_default_format() {
        let parsed = parse_timestamp("2026-10-19T12:30:05.123Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 123);
    }

    #[tokio::test]
    async fn test_empty_payload_is_stored() {
        let store = SqliteSaveStore::connect(&StoreConfig::new("sqlite::memory:"))
            .await
            .unwrap();
        store.ensure_schema().await.unwrap();

        let key = SaveKey::sram("blank.sfc");
        store.upsert(&key, &[]).await.unwrap();

        assert_eq!(store.get_data(&key).await.unwrap(), Vec::<u8>::new());
        let saves = store.list_by_game("blank.sfc").await.unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].size, 0);
    }
}
