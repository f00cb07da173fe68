//! Date-window aggregation over observed temperatures
//!
//! Rows are ordered by their `YYYY-MM-DD` date string, the window is located
//! by exact date matches, and min/mean/max are taken over the slice.

use crate::{DatedTemperature, StorageError};
use serde::{Deserialize, Serialize};

/// Min, mean and max temperature over an aggregate window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    #[serde(rename = "Min Temp")]
    pub min: f64,
    #[serde(rename = "Avg Temp")]
    pub avg: f64,
    #[serde(rename = "Max Temp")]
    pub max: f64,
}

/// Boundaries of an aggregate window
#[derive(Debug, Clone, Copy)]
pub struct WindowBounds<'a> {
    /// First date of the window; must match a stored date exactly
    pub start: &'a str,
    /// Closing date; `None` runs to the end of the series
    pub end: Option<&'a str>,
    /// Keep rows dated `end`. When false the window stops before the first
    /// row dated `end`.
    pub end_inclusive: bool,
}

impl<'a> WindowBounds<'a> {
    /// Window from `start` through the latest observation
    pub fn starting_at(start: &'a str) -> Self {
        Self {
            start,
            end: None,
            end_inclusive: false,
        }
    }

    /// Window from `start` to `end`
    pub fn between(start: &'a str, end: &'a str, end_inclusive: bool) -> Self {
        Self {
            start,
            end: Some(end),
            end_inclusive,
        }
    }
}

/// Index of the first row dated `date`
pub fn locate_first(rows: &[DatedTemperature], date: &str) -> Option<usize> {
    rows.iter().position(|r| r.date == date)
}

fn locate_last(rows: &[DatedTemperature], date: &str) -> Option<usize> {
    rows.iter().rposition(|r| r.date == date)
}

/// Min/mean/max over `rows`, or `None` when empty
pub fn summarize(rows: &[DatedTemperature]) -> Option<TemperatureSummary> {
    let first = rows.first()?.tobs;

    let (min, max, sum) = rows.iter().fold((first, first, 0.0), |(min, max, sum), r| {
        (min.min(r.tobs), max.max(r.tobs), sum + r.tobs)
    });

    Some(TemperatureSummary {
        min,
        avg: sum / rows.len() as f64,
        max,
    })
}

/// Sort `rows` by date and summarize the window described by `bounds`
pub fn aggregate(
    mut rows: Vec<DatedTemperature>,
    bounds: WindowBounds<'_>,
) -> Result<TemperatureSummary, StorageError> {
    // stable, so equal dates keep their fetched order
    rows.sort_by(|a, b| a.date.cmp(&b.date));

    let window = select(&rows, bounds)?;

    summarize(window).ok_or_else(|| StorageError::EmptyWindow {
        start: bounds.start.to_string(),
        end: bounds.end.unwrap_or(bounds.start).to_string(),
    })
}

fn select<'r>(
    rows: &'r [DatedTemperature],
    bounds: WindowBounds<'_>,
) -> Result<&'r [DatedTemperature], StorageError> {
    let from = locate_first(rows, bounds.start)
        .ok_or_else(|| StorageError::DateNotFound(bounds.start.to_string()))?;

    let Some(end) = bounds.end else {
        return Ok(&rows[from..]);
    };

    let to = if bounds.end_inclusive {
        locate_last(rows, end).map(|i| i + 1)
    } else {
        locate_first(rows, end)
    }
    .ok_or_else(|| StorageError::DateNotFound(end.to_string()))?;

    if to <= from {
        return Ok(&[]);
    }
    Ok(&rows[from..to])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(date: &str, tobs: f64) -> DatedTemperature {
        DatedTemperature {
            date: date.to_string(),
            tobs,
        }
    }

    fn three_days() -> Vec<DatedTemperature> {
        vec![
            row("2020-01-03", 75.0),
            row("2020-01-01", 70.0),
            row("2020-01-02", 72.0),
        ]
    }

    #[test]
    fn test_end_exclusive_window() {
        let summary = aggregate(
            three_days(),
            WindowBounds::between("2020-01-01", "2020-01-03", false),
        )
        .unwrap();

        assert_eq!(summary.min, 70.0);
        assert_eq!(summary.avg, 71.0);
        assert_eq!(summary.max, 72.0);
    }

    #[test]
    fn test_end_inclusive_window() {
        let summary = aggregate(
            three_days(),
            WindowBounds::between("2020-01-01", "2020-01-03", true),
        )
        .unwrap();

        assert_eq!(summary.min, 70.0);
        assert!((summary.avg - 217.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.max, 75.0);
    }

    #[test]
    fn test_inclusive_end_takes_every_row_on_end_date() {
        let mut rows = three_days();
        rows.push(row("2020-01-03", 60.0));
        rows.push(row("2020-01-04", 90.0));

        let bounds = WindowBounds::between("2020-01-02", "2020-01-03", true);
        let summary = aggregate(rows, bounds).unwrap();
        assert_eq!(summary.min, 60.0);
        assert_eq!(summary.max, 75.0);
    }

    #[test]
    fn test_start_only_runs_to_end() {
        let summary = aggregate(three_days(), WindowBounds::starting_at("2020-01-02")).unwrap();
        assert_eq!(summary.min, 72.0);
        assert_eq!(summary.avg, 73.5);
        assert_eq!(summary.max, 75.0);
    }

    #[test]
    fn test_start_matches_first_of_duplicates() {
        let rows = vec![
            row("2020-01-02", 50.0),
            row("2020-01-01", 70.0),
            row("2020-01-02", 80.0),
        ];
        let summary = aggregate(rows, WindowBounds::starting_at("2020-01-02")).unwrap();
        assert_eq!(summary.min, 50.0);
        assert_eq!(summary.max, 80.0);
    }

    #[test]
    fn test_unknown_start() {
        let err = aggregate(three_days(), WindowBounds::starting_at("2099-01-01")).unwrap_err();
        assert!(matches!(err, StorageError::DateNotFound(d) if d == "2099-01-01"));
    }

    #[test]
    fn test_unknown_end() {
        let err = aggregate(
            three_days(),
            WindowBounds::between("2020-01-01", "2099-01-01", false),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::DateNotFound(d) if d == "2099-01-01"));
    }

    #[test]
    fn test_same_start_and_end_exclusive_is_empty() {
        let err = aggregate(
            three_days(),
            WindowBounds::between("2020-01-02", "2020-01-02", false),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::EmptyWindow { .. }));

        let summary = aggregate(
            three_days(),
            WindowBounds::between("2020-01-02", "2020-01-02", true),
        )
        .unwrap();
        assert_eq!(summary.min, 72.0);
        assert_eq!(summary.max, 72.0);
    }

    #[test]
    fn test_reversed_bounds_are_empty() {
        let err = aggregate(
            three_days(),
            WindowBounds::between("2020-01-03", "2020-01-01", true),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::EmptyWindow { .. }));
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), None);
    }

    fn arb_rows() -> impl Strategy<Value = Vec<DatedTemperature>> {
        prop::collection::vec((1u32..=28, 40.0f64..95.0), 1..60).prop_map(|raw| {
            raw.into_iter()
                .map(|(day, tobs)| row(&format!("2017-02-{day:02}"), tobs))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_start_at_min_date_covers_table(rows in arb_rows()) {
            let min_date = rows.iter().map(|r| r.date.clone()).min().unwrap();
            let full = summarize(&rows).unwrap();
            let windowed = aggregate(rows, WindowBounds::starting_at(&min_date)).unwrap();

            prop_assert_eq!(windowed.min, full.min);
            prop_assert_eq!(windowed.max, full.max);
            prop_assert!((windowed.avg - full.avg).abs() < 1e-9);
        }

        #[test]
        fn prop_window_stays_within_table_bounds(rows in arb_rows(), pick in 0usize..60) {
            let start = rows[pick % rows.len()].date.clone();
            let full = summarize(&rows).unwrap();
            let windowed = aggregate(rows, WindowBounds::starting_at(&start)).unwrap();

            prop_assert!(windowed.min >= full.min);
            prop_assert!(windowed.max <= full.max);
            prop_assert!(windowed.min <= windowed.avg + 1e-9);
            prop_assert!(windowed.avg <= windowed.max + 1e-9);
        }
    }
}
