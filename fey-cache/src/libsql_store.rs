//! `api_cache` table on libSQL / Turso.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{params, Connection};
use tracing::instrument;

use fey_core::error::{FeyError, Result};
use fey_core::traits::CacheStore;
use fey_core::types::CacheEntry;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS api_cache (
    cache_key  TEXT PRIMARY KEY,
    data       TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
";

const SELECT_ENTRY: &str =
    "SELECT cache_key, data, updated_at, expires_at FROM api_cache WHERE cache_key = ?1";

const UPSERT_ENTRY: &str = "
INSERT INTO api_cache (cache_key, data, updated_at, expires_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(cache_key) DO UPDATE SET
    data = excluded.data,
    updated_at = excluded.updated_at,
    expires_at = excluded.expires_at
";

fn storage_err(e: libsql::Error) -> FeyError {
    FeyError::StorageError(e.to_string())
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| FeyError::StorageError(format!("bad timestamp '{raw}': {e}")))
}

/// Cache store backed by the `api_cache` table.
#[derive(Clone)]
pub struct LibsqlCacheStore {
    conn: Connection,
}

impl LibsqlCacheStore {
    /// Wraps a connection, creating the table if it does not exist.
    pub async fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).await.map_err(storage_err)?;
        Ok(Self { conn })
    }

    /// Returns the number of rows stored under `key`.
    pub async fn rows_for(&self, key: &str) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM api_cache WHERE cache_key = ?1", params![key.to_string()])
            .await
            .map_err(storage_err)?;

        match rows.next().await.map_err(storage_err)? {
            Some(row) => {
                let count: i64 = row.get(0).map_err(storage_err)?;
                Ok(count.max(0) as u64)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl CacheStore for LibsqlCacheStore {
    #[instrument(skip(self))]
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut rows = self
            .conn
            .query(SELECT_ENTRY, params![key.to_string()])
            .await
            .map_err(storage_err)?;

        let Some(row) = rows.next().await.map_err(storage_err)? else {
            return Ok(None);
        };

        let key: String = row.get(0).map_err(storage_err)?;
        let data: String = row.get(1).map_err(storage_err)?;
        let updated_at: String = row.get(2).map_err(storage_err)?;
        let expires_at: String = row.get(3).map_err(storage_err)?;

        Ok(Some(CacheEntry {
            key,
            value: serde_json::from_str(&data)?,
            updated_at: parse_ts(&updated_at)?,
            expires_at: parse_ts(&expires_at)?,
        }))
    }

    #[instrument(skip(self, entry), fields(key = %entry.key))]
    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        let data = serde_json::to_string(&entry.value)?;
        self.conn
            .execute(
                UPSERT_ENTRY,
                params![
                    entry.key,
                    data,
                    format_ts(entry.updated_at),
                    format_ts(entry.expires_at)
                ],
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}
