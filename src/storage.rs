//! SQLite storage layer for Stepwise.
//!
//! Two independent records are kept, each a complete snapshot:
//!
//! - `samples`: the ordered sample store, rewritten in full on every mutation
//! - `goals`: a single row holding the goal configuration
//!
//! Every write runs in one transaction, so an interrupted write leaves the
//! previous snapshot in place. Timestamps are stored as RFC 3339 text with
//! full sub-second precision so deduplication keys compare equal after a restart.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use uuid::Uuid;

use crate::model::{GoalConfig, Sample};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Create a new storage instance and initialize the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite connection string (e.g., "sqlite:stepwise.db?mode=rwc" or "sqlite::memory:")
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // A single connection serializes writers and keeps in-memory databases alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect(database_url)
            .await
            .with_context(|| format!("failed to open database {database_url}"))?;

        let storage = Self { pool };
        storage.initialize_schema().await?;

        Ok(storage)
    }

    async fn initialize_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS samples (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                device_id TEXT NOT NULL,
                model TEXT NOT NULL,
                os_version TEXT NOT NULL,
                steps INTEGER NOT NULL,
                distance REAL NOT NULL,
                calories REAL NOT NULL,
                start_ts TEXT NOT NULL,
                end_ts TEXT NOT NULL,
                received_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS goals (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                steps INTEGER NOT NULL,
                calories REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load the persisted sample snapshot in insertion order.
    pub async fn load_samples(&self) -> anyhow::Result<Vec<Sample>> {
        let rows = sqlx::query(
            r#"
            SELECT id, device_id, model, os_version, steps, distance, calories,
                   start_ts, end_ts, received_at
            FROM samples
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(sample_from_row).collect()
    }

    /// Replace the persisted sample snapshot with `samples`.
    pub async fn save_samples(&self, samples: &[Sample]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM samples").execute(&mut *tx).await?;

        for (position, sample) in samples.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO samples (
                    position, id, device_id, model, os_version, steps, distance, calories,
                    start_ts, end_ts, received_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(position as i64)
            .bind(sample.id.to_string())
            .bind(&sample.device_id)
            .bind(&sample.model)
            .bind(&sample.os_version)
            .bind(steps_column(sample.steps)?)
            .bind(sample.distance)
            .bind(sample.calories)
            .bind(format_ts(sample.start))
            .bind(format_ts(sample.end))
            .bind(format_ts(sample.received_at))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Load the persisted goal configuration, if one was ever saved.
    pub async fn load_goals(&self) -> anyhow::Result<Option<GoalConfig>> {
        let row = sqlx::query("SELECT steps, calories FROM goals WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let steps = steps_from_row(&row)?;
        let calories: f64 = row.get("calories");
        if steps == 0 {
            anyhow::bail!("stored steps goal must be positive, found 0");
        }
        if !calories.is_finite() || calories <= 0.0 {
            anyhow::bail!("stored calorie goal must be positive, found {calories}");
        }

        Ok(Some(GoalConfig { steps, calories }))
    }

    /// Overwrite the persisted goal configuration.
    pub async fn save_goals(&self, goals: &GoalConfig) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO goals (id, steps, calories)
            VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET steps = excluded.steps, calories = excluded.calories
            "#,
        )
        .bind(steps_column(goals.steps)?)
        .bind(goals.calories)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Close the pool. Later writes fail with a persistence error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_ts(row: &SqliteRow, column: &str) -> anyhow::Result<DateTime<Utc>> {
    let raw: String = row.get(column);
    let ts = DateTime::parse_from_rfc3339(&raw)
        .with_context(|| format!("invalid {column} timestamp {raw:?}"))?;
    Ok(ts.with_timezone(&Utc))
}

/// Step counts above `i64::MAX` do not fit the INTEGER column and are refused.
fn steps_column(steps: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(steps).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn steps_from_row(row: &SqliteRow) -> anyhow::Result<u64> {
    let steps: i64 = row.get("steps");
    u64::try_from(steps).with_context(|| format!("invalid stored step count {steps}"))
}

fn sample_from_row(row: &SqliteRow) -> anyhow::Result<Sample> {
    let id: String = row.get("id");

    Ok(Sample {
        id: Uuid::parse_str(&id).with_context(|| format!("invalid sample id {id:?}"))?,
        device_id: row.get("device_id"),
        model: row.get("model"),
        os_version: row.get("os_version"),
        steps: steps_from_row(row)?,
        distance: row.get("distance"),
        calories: row.get("calories"),
        start: parse_ts(row, "start_ts")?,
        end: parse_ts(row, "end_ts")?,
        received_at: parse_ts(row, "received_at")?,
    })
}
