//! Stats record persistence.
//!
//! A single sqlite row holds the cumulative visitor count and earnings total
//! for the dashboard. The row is seeded once at first boot and only ever
//! grows afterwards. All arithmetic happens inside the UPDATE statement, so
//! concurrent writers (the growth task and the track-visit endpoint) can
//! never lose each other's increments, and a reader can never observe a
//! half-applied combined update.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::error::{Error, Result};
use crate::tracing::prelude::*;

/// Fixed key of the singleton stats row.
const STATS_ID: &str = "main";

/// Seed values applied when the stats row does not exist yet.
const SEED_VISITORS: i64 = 1240;
const SEED_EARNINGS: f64 = 1250.80;

/// The persisted dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StatsRecord {
    pub id: String,
    pub visitors: i64,
    pub earnings: f64,
}

/// Handle to the stats database. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct StatsStore {
    pool: SqlitePool,
}

impl StatsStore {
    /// Open (or create) the stats database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("opening stats db at {}", path.display());

        let pool = SqlitePoolOptions::new()
            .min_connections(0)
            .max_connections(4)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(path)
                    .journal_mode(SqliteJournalMode::Wal)
                    .create_if_missing(true)
                    .busy_timeout(Duration::from_secs(5)),
            )
            .await?;

        Ok(Self { pool })
    }

    /// Open a transient in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        // A second connection would see a different empty database, so the
        // pool is pinned to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await?;

        Ok(Self { pool })
    }

    /// Create the schema and seed the stats row if it does not exist.
    ///
    /// Safe to call on every boot: an existing row is left untouched.
    pub async fn ensure_initialized(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS stats (
                id TEXT PRIMARY KEY,
                visitors INTEGER NOT NULL,
                earnings REAL NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let seeded = sqlx::query(
            "INSERT OR IGNORE INTO stats (id, visitors, earnings)
             VALUES (?, ?, ?)",
        )
        .bind(STATS_ID)
        .bind(SEED_VISITORS)
        .bind(SEED_EARNINGS)
        .execute(&self.pool)
        .await?;

        if seeded.rows_affected() > 0 {
            info!(
                visitors = SEED_VISITORS,
                earnings = SEED_EARNINGS,
                "seeded stats record"
            );
        }
        Ok(())
    }

    /// Read the current stats record.
    pub async fn read(&self) -> Result<StatsRecord> {
        sqlx::query_as::<_, StatsRecord>(
            "SELECT id, visitors, earnings FROM stats WHERE id = ?",
        )
        .bind(STATS_ID)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::StatsMissing)
    }

    /// Atomically add `by` to the visitor count.
    pub async fn increment_visitors(&self, by: i64) -> Result<()> {
        sqlx::query("UPDATE stats SET visitors = visitors + ? WHERE id = ?")
            .bind(by)
            .bind(STATS_ID)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Atomically add `amount` to the earnings total.
    pub async fn add_earnings(&self, amount: f64) -> Result<()> {
        sqlx::query("UPDATE stats SET earnings = earnings + ? WHERE id = ?")
            .bind(amount)
            .bind(STATS_ID)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Apply one growth tick: both deltas in a single UPDATE, so no reader
    /// ever sees the visitor bump without the earnings bump.
    pub async fn record_tick(
        &self,
        visitor_delta: i64,
        earnings_delta: f64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE stats
             SET visitors = visitors + ?, earnings = earnings + ?
             WHERE id = ?",
        )
        .bind(visitor_delta)
        .bind(earnings_delta)
        .bind(STATS_ID)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
