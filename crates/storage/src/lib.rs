//! Storage Layer
//!
//! Read-only access to the climate `measurement` table in a pre-populated
//! SQLite store, plus the date-window aggregation used by the summary routes.

mod repository;
mod window;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use repository::{DatedTemperature, Precipitation, Repository};
pub use window::{aggregate, locate_first, summarize, TemperatureSummary, WindowBounds};

#[cfg(any(test, feature = "fixtures"))]
pub use repository::Observation;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Table `{0}` not found in store")]
    MissingTable(&'static str),
    #[error("Table `{table}` is missing column `{column}`")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("No observation dated {0}")]
    DateNotFound(String),
    #[error("No observations between {start} and {end}")]
    EmptyWindow { start: String, end: String },
    #[error("Invalid date {value}: {reason}")]
    InvalidDate { value: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
