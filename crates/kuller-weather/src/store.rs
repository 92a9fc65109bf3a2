//! SQLite-backed observation storage.
//!
//! Append-only: each fetch cycle inserts its batch in one transaction and
//! nothing ever updates or deletes a stored reading. The latest reading per
//! city is derived on every read. The connection sits behind a mutex so the
//! scheduler's write cycle and concurrent quote reads never interleave.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::observation::Observation;

/// Errors from observation storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

/// Durable store of weather observations, keyed by city.
pub struct ObservationStore {
    conn: Mutex<Connection>,
}

impl ObservationStore {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create observation database directory")?;
            }
        }

        let conn = Connection::open(path).context("Failed to open observation database")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (tests, ephemeral runs).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS observations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                station TEXT NOT NULL,
                wmo_code TEXT NOT NULL DEFAULT '',
                air_temperature REAL NOT NULL,
                wind_speed REAL NOT NULL,
                phenomenon TEXT NOT NULL DEFAULT '',
                timestamp TEXT NOT NULL,
                city TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_observations_city ON observations(city);
            CREATE INDEX IF NOT EXISTS idx_observations_timestamp ON observations(timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Append a batch of observations in a single transaction.
    ///
    /// Returns the number of rows written. Readers see either the pre-batch
    /// or post-batch state, never part of one.
    pub fn append(&self, observations: &[Observation]) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::storage(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO observations
                     (station, wmo_code, air_temperature, wind_speed, phenomenon, timestamp, city)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(|e| StoreError::storage(e.to_string()))?;

            for obs in observations {
                stmt.execute(params![
                    obs.station,
                    obs.wmo_code,
                    obs.air_temperature,
                    obs.wind_speed,
                    obs.phenomenon,
                    format_timestamp(obs.timestamp),
                    obs.city,
                ])
                .map_err(|e| StoreError::storage(e.to_string()))?;
            }
        }

        tx.commit().map_err(|e| StoreError::storage(e.to_string()))?;

        tracing::debug!("Appended {} observations", observations.len());
        Ok(observations.len())
    }

    /// Latest stored observation for a city, if any.
    pub fn latest_for_city(&self, city: &str) -> Result<Option<Observation>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT station, wmo_code, air_temperature, wind_speed, phenomenon, timestamp, city
                 FROM observations
                 WHERE city = ?1
                 ORDER BY timestamp DESC
                 LIMIT 1",
            )
            .map_err(|e| StoreError::storage(e.to_string()))?;

        let mut rows = stmt
            .query(params![city])
            .map_err(|e| StoreError::storage(e.to_string()))?;

        match rows.next().map_err(|e| StoreError::storage(e.to_string()))? {
            Some(row) => Ok(Some(
                Self::row_to_observation(row).map_err(|e| StoreError::storage(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    /// Total number of stored observations.
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))
            .map_err(|e| StoreError::storage(e.to_string()))?;
        Ok(count as usize)
    }

    fn row_to_observation(row: &rusqlite::Row) -> rusqlite::Result<Observation> {
        let timestamp_str: String = row.get(5)?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Observation {
            station: row.get(0)?,
            wmo_code: row.get(1)?,
            air_temperature: row.get(2)?,
            wind_speed: row.get(3)?,
            phenomenon: row.get(4)?,
            timestamp,
            city: row.get(6)?,
        })
    }
}

/// Fixed-width RFC 3339 so lexicographic order matches chronological order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
