//! Temporary on-disk climate stores for tests

use crate::{Repository, StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `(station, date, prcp, tobs)`; ids are assigned in slice order
pub type FixtureRow = (&'static str, &'static str, Option<f64>, f64);

const CREATE_MEASUREMENT: &str = "CREATE TABLE measurement (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    station TEXT NOT NULL, \
    date TEXT NOT NULL, \
    prcp FLOAT, \
    tobs FLOAT NOT NULL)";

/// A SQLite file in a temporary directory, removed on drop
pub struct FixtureStore {
    _dir: TempDir,
    path: PathBuf,
}

impl FixtureStore {
    /// Create a store with a populated measurement table
    pub async fn create(rows: &[FixtureRow]) -> Result<Self, StorageError> {
        let store = Self::from_statements(&[CREATE_MEASUREMENT]).await?;
        let pool = store.writable_pool().await?;

        for (station, date, prcp, tobs) in rows {
            sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
                .bind(*station)
                .bind(*date)
                .bind(*prcp)
                .bind(*tobs)
                .execute(&pool)
                .await?;
        }

        pool.close().await;
        Ok(store)
    }

    /// Create a store by running raw SQL statements
    pub async fn from_statements(statements: &[&str]) -> Result<Self, StorageError> {
        let dir = tempfile::tempdir()?;
        let store = Self {
            path: dir.path().join("climate.sqlite"),
            _dir: dir,
        };

        let pool = store.writable_pool().await?;
        for statement in statements {
            sqlx::query(statement).execute(&pool).await?;
        }
        pool.close().await;

        Ok(store)
    }

    /// Path to the SQLite file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the store read-only through the production path
    pub async fn open(&self) -> Result<Repository, StorageError> {
        Repository::open(&self.path, 2).await
    }

    async fn writable_pool(&self) -> Result<sqlx::SqlitePool, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);
        Ok(SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?)
    }
}

/// A small slice of the Hawaii dataset, deliberately out of date order
pub fn sample_rows() -> Vec<FixtureRow> {
    vec![
        ("USC00519397", "2010-01-01", Some(0.08), 65.0),
        ("USC00519397", "2016-08-23", Some(0.00), 81.0),
        ("USC00519281", "2016-08-24", Some(2.15), 77.0),
        ("USC00519281", "2016-08-23", Some(1.79), 77.0),
        ("USC00513117", "2017-01-01", None, 62.0),
        ("USC00519281", "2017-01-01", Some(0.03), 72.0),
        ("USC00519281", "2010-01-01", Some(0.15), 70.0),
        ("USC00513117", "2017-08-23", Some(0.00), 81.0),
        ("USC00519281", "2017-08-18", None, 79.0),
        ("USC00519397", "2017-08-23", Some(0.00), 82.0),
        ("USC00519281", "2017-08-23", Some(0.45), 76.0),
    ]
}
