//! `fey_rates` table on libSQL / Turso.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{params, Connection};
use tracing::{debug, instrument};

use fey_core::error::{FeyError, Result};
use fey_core::traits::RateHistory;
use fey_core::types::RateSnapshot;

// Timestamps are fixed-width RFC 3339 UTC strings, so text order is time order.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fey_rates (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    xfey_amount     INTEGER NOT NULL,
    fey_amount      INTEGER NOT NULL,
    conversion_rate REAL NOT NULL,
    gains_percent   REAL NOT NULL,
    timestamp       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
CREATE INDEX IF NOT EXISTS idx_fey_rates_timestamp ON fey_rates (timestamp);
";

const INSERT_RATE: &str = "
INSERT INTO fey_rates (xfey_amount, fey_amount, conversion_rate, gains_percent, timestamp)
VALUES (?1, ?2, ?3, ?4, ?5)
";

const SELECT_RATES: &str = "
SELECT xfey_amount, fey_amount, conversion_rate, gains_percent, timestamp
FROM fey_rates
ORDER BY timestamp ASC, id ASC
LIMIT ?1
";

fn storage_err(e: libsql::Error) -> FeyError {
    FeyError::StorageError(e.to_string())
}

fn to_i64(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| FeyError::StorageError(format!("{column} out of range: {value}")))
}

fn to_u64(value: i64, column: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| FeyError::StorageError(format!("negative {column}: {value}")))
}

/// Rate history backed by the `fey_rates` table.
#[derive(Clone)]
pub struct LibsqlRateHistory {
    conn: Connection,
}

impl LibsqlRateHistory {
    /// Wraps a connection, creating the table if it does not exist.
    pub async fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).await.map_err(storage_err)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl RateHistory for LibsqlRateHistory {
    #[instrument(skip(self, snapshot), fields(fey_amount = snapshot.fey_amount))]
    async fn record(&self, snapshot: &RateSnapshot) -> Result<()> {
        self.conn
            .execute(
                INSERT_RATE,
                params![
                    to_i64(snapshot.xfey_amount, "xfey_amount")?,
                    to_i64(snapshot.fey_amount, "fey_amount")?,
                    snapshot.conversion_rate,
                    snapshot.gains_percent,
                    snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
                ],
            )
            .await
            .map_err(storage_err)?;
        debug!("Saved rate snapshot");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: usize) -> Result<Vec<RateSnapshot>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut rows = self
            .conn
            .query(SELECT_RATES, params![limit])
            .await
            .map_err(storage_err)?;

        let mut snapshots = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            let xfey_amount: i64 = row.get(0).map_err(storage_err)?;
            let fey_amount: i64 = row.get(1).map_err(storage_err)?;
            let conversion_rate: f64 = row.get(2).map_err(storage_err)?;
            let gains_percent: f64 = row.get(3).map_err(storage_err)?;
            let timestamp: String = row.get(4).map_err(storage_err)?;

            snapshots.push(RateSnapshot {
                xfey_amount: to_u64(xfey_amount, "xfey_amount")?,
                fey_amount: to_u64(fey_amount, "fey_amount")?,
                conversion_rate,
                gains_percent,
                timestamp: DateTime::parse_from_rfc3339(&timestamp)
                    .map(|ts| ts.with_timezone(&Utc))
                    .map_err(|e| FeyError::StorageError(format!("bad timestamp '{timestamp}': {e}")))?,
            });
        }

        Ok(snapshots)
    }

    async fn count(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM fey_rates", ())
            .await
            .map_err(storage_err)?;

        match rows.next().await.map_err(storage_err)? {
            Some(row) => {
                let count: i64 = row.get(0).map_err(storage_err)?;
                to_u64(count, "count")
            }
            None => Ok(0),
        }
    }
}
