//! Repository Implementation

use crate::StorageError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Name of the observation table, as a literal usable in `concat!`
macro_rules! measurement_table {
    () => {
        "measurement"
    };
}

const MEASUREMENT_TABLE: &str = measurement_table!();

/// Columns the service reads from the observation table
const REQUIRED_COLUMNS: [&str; 5] = ["id", "station", "date", "prcp", "tobs"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One stored weather reading
#[cfg(any(test, feature = "fixtures"))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Observation {
    pub id: i64,
    pub station: String,
    pub date: String,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

/// Precipitation reading keyed by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Precipitation {
    pub date: String,
    pub prcp: Option<f64>,
}

/// Observed temperature keyed by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DatedTemperature {
    pub date: String,
    pub tobs: f64,
}

#[derive(sqlx::FromRow)]
struct StationTemperature {
    date: String,
    station: String,
    tobs: f64,
}

/// Read-only repository over the measurement table.
///
/// Every query checks a connection out of the pool and hands it back when
/// the query future completes, including on error.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open an existing SQLite store read-only and verify its schema.
    ///
    /// The file is never created; a missing or unreadable store fails here.
    pub async fn open(
        path: impl AsRef<Path>,
        max_connections: u32,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref();
        info!("Opening climate store at {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let repository = Self { pool };
        repository.reflect().await?;
        Ok(repository)
    }

    /// Check that the measurement table exists with the columns we query
    async fn reflect(&self) -> Result<(), StorageError> {
        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
                .bind(MEASUREMENT_TABLE)
                .fetch_all(&self.pool)
                .await?;

        if columns.is_empty() {
            return Err(StorageError::MissingTable(MEASUREMENT_TABLE));
        }

        for column in REQUIRED_COLUMNS {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                return Err(StorageError::MissingColumn {
                    table: MEASUREMENT_TABLE,
                    column,
                });
            }
        }

        debug!("Reflected {} columns on {}", columns.len(), MEASUREMENT_TABLE);
        Ok(())
    }

    /// Last `limit` precipitation readings by insertion order, newest first
    pub async fn recent_precipitation(
        &self,
        limit: u32,
    ) -> Result<Vec<Precipitation>, StorageError> {
        let rows = sqlx::query_as::<_, Precipitation>(concat!(
            "SELECT date, prcp FROM ",
            measurement_table!(),
            " ORDER BY id DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} precipitation rows", rows.len());
        Ok(rows)
    }

    /// Precipitation readings within twelve months of the latest stored date,
    /// newest insertion first
    pub async fn last_year_precipitation(&self) -> Result<Vec<Precipitation>, StorageError> {
        let Some(latest) = self.latest_date().await? else {
            return Ok(Vec::new());
        };
        let cutoff = year_before(&latest)?;

        let rows = sqlx::query_as::<_, Precipitation>(concat!(
            "SELECT date, prcp FROM ",
            measurement_table!(),
            " WHERE date >= ? ORDER BY id DESC"
        ))
        .bind(&cutoff)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} precipitation rows since {}", rows.len(), cutoff);
        Ok(rows)
    }

    /// Greatest stored date, if any rows exist
    pub async fn latest_date(&self) -> Result<Option<String>, StorageError> {
        let latest: Option<String> =
            sqlx::query_scalar(concat!("SELECT MAX(date) FROM ", measurement_table!()))
                .fetch_one(&self.pool)
                .await?;
        Ok(latest)
    }

    /// Distinct station identifiers, sorted ascending
    pub async fn stations(&self) -> Result<Vec<String>, StorageError> {
        let rows: Vec<String> =
            sqlx::query_scalar(concat!("SELECT station FROM ", measurement_table!()))
                .fetch_all(&self.pool)
                .await?;

        let unique: BTreeSet<String> = rows.into_iter().collect();
        Ok(unique.into_iter().collect())
    }

    /// Station with the most observations; ties go to the lowest identifier
    pub async fn most_active_station(&self) -> Result<Option<String>, StorageError> {
        let station: Option<String> = sqlx::query_scalar(concat!(
            "SELECT station FROM ",
            measurement_table!(),
            " GROUP BY station ORDER BY COUNT(*) DESC, station ASC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(station)
    }

    /// Temperatures reported by `station`, newest insertion first, at most `limit`
    pub async fn station_temperatures(
        &self,
        station: &str,
        limit: usize,
    ) -> Result<Vec<DatedTemperature>, StorageError> {
        let rows = sqlx::query_as::<_, StationTemperature>(concat!(
            "SELECT date, station, tobs FROM ",
            measurement_table!(),
            " ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let filtered: Vec<_> = rows
            .into_iter()
            .filter(|r| r.station == station)
            .take(limit)
            .map(|r| DatedTemperature {
                date: r.date,
                tobs: r.tobs,
            })
            .collect();

        debug!("Fetched {} temperatures for {}", filtered.len(), station);
        Ok(filtered)
    }

    /// Every `(date, tobs)` pair, newest insertion first
    pub async fn temperatures(&self) -> Result<Vec<DatedTemperature>, StorageError> {
        let rows = sqlx::query_as::<_, DatedTemperature>(concat!(
            "SELECT date, tobs FROM ",
            measurement_table!(),
            " ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every stored observation in insertion order
    #[cfg(any(test, feature = "fixtures"))]
    pub async fn observations(&self) -> Result<Vec<Observation>, StorageError> {
        let rows = sqlx::query_as::<_, Observation>(concat!(
            "SELECT id, station, date, prcp, tobs FROM ",
            measurement_table!(),
            " ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Date twelve calendar months before `date`, clamped to month end
fn year_before(date: &str) -> Result<String, StorageError> {
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| {
        StorageError::InvalidDate {
            value: date.to_string(),
            reason: e.to_string(),
        }
    })?;

    let cutoff = parsed
        .checked_sub_months(Months::new(12))
        .ok_or_else(|| StorageError::InvalidDate {
            value: date.to_string(),
            reason: "out of range".to_string(),
        })?;

    Ok(cutoff.format(DATE_FORMAT).to_string())
}
