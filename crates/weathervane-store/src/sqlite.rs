//! SQLite-based search history.
//!
//! One row per city in `searches`; the hourly forecasts shown on a history
//! entry live in `forecasts`, ordered by `position`.
//!
//! Times and temperatures are stored as received and formatted for display
//! on read: the search time as a full date, forecast times as an hour, and
//! temperatures in Celsius.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;
use weathervane_core::RusqliteErrorExt;
use weathervane_weather::format::{display_celsius, display_time, DisplayFormat};
use weathervane_weather::{ForecastPoint, SearchRecord};

use crate::backend::{validate_record, SearchBackend, StoreError, StoreResult};

/// SQLite-based search history store.
pub struct SqliteSearchStore {
    conn: Connection,
}

impl SqliteSearchStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS searches (
                id TEXT PRIMARY KEY,
                city TEXT NOT NULL UNIQUE,
                time TEXT NOT NULL,
                observed_at TEXT NOT NULL,
                weather_code INTEGER NOT NULL,
                temperature TEXT NOT NULL,
                temperature_apparent TEXT NOT NULL,
                searched_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS forecasts (
                id TEXT NOT NULL,
                search_id TEXT NOT NULL REFERENCES searches(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                weather_code INTEGER NOT NULL,
                temperature TEXT NOT NULL,
                time TEXT NOT NULL,
                PRIMARY KEY (search_id, position)
            );

            CREATE INDEX IF NOT EXISTS idx_searches_observed ON searches(observed_at DESC, searched_at DESC);
            "#,
        )?;
        Ok(())
    }

    fn timestamp(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn parse_uuid(idx: usize, raw: &str) -> rusqlite::Result<Uuid> {
        Uuid::parse_str(raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    /// Convert a `searches` row to a display record without forecasts.
    fn row_to_search(row: &rusqlite::Row) -> rusqlite::Result<SearchRecord> {
        let id: String = row.get(0)?;
        let time: String = row.get(2)?;
        let observed_at_str: String = row.get(3)?;
        let temperature: String = row.get(5)?;
        let temperature_apparent: String = row.get(6)?;

        let observed_at = DateTime::parse_from_rfc3339(&observed_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(SearchRecord {
            id: Self::parse_uuid(0, &id)?,
            city: row.get(1)?,
            time: display_time(&time, DisplayFormat::FullDateWithTime),
            observed_at,
            weather_code: row.get(4)?,
            temperature: display_celsius(&temperature),
            temperature_apparent: display_celsius(&temperature_apparent),
            forecasts: Vec::new(),
        })
    }

    fn row_to_forecast(row: &rusqlite::Row) -> rusqlite::Result<ForecastPoint> {
        let id: String = row.get(0)?;
        let temperature: String = row.get(2)?;
        let time: String = row.get(3)?;
        Ok(ForecastPoint {
            id: Self::parse_uuid(0, &id)?,
            weather_code: row.get(1)?,
            temperature: display_celsius(&temperature),
            time: display_time(&time, DisplayFormat::Hour),
        })
    }

    fn load_forecasts(&self, search_id: &Uuid) -> rusqlite::Result<Vec<ForecastPoint>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, weather_code, temperature, time
             FROM forecasts
             WHERE search_id = ?1
             ORDER BY position",
        )?;
        let rows = stmt.query_map(params![search_id.to_string()], Self::row_to_forecast)?;
        rows.collect()
    }

    /// Get the number of stored searches.
    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM searches", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.into_database_error()))?;
        Ok(count as usize)
    }

    fn write_record(&self, record: &SearchRecord) -> rusqlite::Result<Uuid> {
        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM searches WHERE city = ?1",
                params![record.city],
                |row| row.get(0),
            )
            .optional()?;

        let observed_at = Self::timestamp(&record.observed_at);
        let searched_at = Self::timestamp(&Utc::now());

        let id = match existing {
            Some(id) => {
                let id = Self::parse_uuid(0, &id)?;
                tx.execute(
                    "UPDATE searches
                     SET time = ?2, observed_at = ?3, weather_code = ?4, temperature = ?5,
                         temperature_apparent = ?6, searched_at = ?7
                     WHERE id = ?1",
                    params![
                        id.to_string(),
                        record.time,
                        observed_at,
                        record.weather_code,
                        record.temperature,
                        record.temperature_apparent,
                        searched_at,
                    ],
                )?;
                tx.execute(
                    "DELETE FROM forecasts WHERE search_id = ?1",
                    params![id.to_string()],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO searches
                     (id, city, time, observed_at, weather_code, temperature, temperature_apparent, searched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        record.id.to_string(),
                        record.city,
                        record.time,
                        observed_at,
                        record.weather_code,
                        record.temperature,
                        record.temperature_apparent,
                        searched_at,
                    ],
                )?;
                record.id
            }
        };

        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO forecasts (id, search_id, position, weather_code, temperature, time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, forecast) in record.forecasts.iter().enumerate() {
                insert.execute(params![
                    forecast.id.to_string(),
                    id.to_string(),
                    position as i64,
                    forecast.weather_code,
                    forecast.temperature,
                    forecast.time,
                ])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }
}

impl SearchBackend for SqliteSearchStore {
    fn list_searches(&self) -> StoreResult<Vec<SearchRecord>> {
        let load = || -> rusqlite::Result<Vec<SearchRecord>> {
            let mut stmt = self.conn.prepare_cached(
                "SELECT id, city, time, observed_at, weather_code, temperature, temperature_apparent
                 FROM searches
                 ORDER BY observed_at DESC, searched_at DESC",
            )?;
            let mut searches = stmt
                .query_map([], Self::row_to_search)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for search in &mut searches {
                search.forecasts = self.load_forecasts(&search.id)?;
            }
            Ok(searches)
        };

        load().map_err(|e| match e {
            rusqlite::Error::FromSqlConversionFailure(..) => StoreError::storage(e.to_string()),
            other => StoreError::Database(other.into_database_error()),
        })
    }

    fn upsert(&self, record: &SearchRecord) -> StoreResult<SearchRecord> {
        validate_record(record)?;

        let id = self
            .write_record(record)
            .map_err(|e| StoreError::Database(e.into_database_error()))?;

        if id != record.id {
            tracing::debug!("Updated existing search for {:?} ({})", record.city, id);
        } else {
            tracing::debug!("Inserted search for {:?} ({})", record.city, id);
        }

        Ok(SearchRecord {
            id,
            ..record.clone()
        })
    }

    fn find_by_city(&self, city: &str) -> StoreResult<Option<SearchRecord>> {
        let find = || -> rusqlite::Result<Option<SearchRecord>> {
            let search = self
                .conn
                .query_row(
                    "SELECT id, city, time, observed_at, weather_code, temperature, temperature_apparent
                     FROM searches
                     WHERE city = ?1",
                    params![city],
                    Self::row_to_search,
                )
                .optional()?;

            match search {
                Some(mut search) => {
                    search.forecasts = self.load_forecasts(&search.id)?;
                    Ok(Some(search))
                }
                None => Ok(None),
            }
        };

        find().map_err(|e| StoreError::Database(e.into_database_error()))
    }
}
