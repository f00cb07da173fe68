//! Temperature Observation Route

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::flatten_pairs;
use crate::{ApiError, AppState};

/// Temperatures for one station as `[date, temp, ...]`, newest insertion first
pub async fn get_tobs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Value>>, ApiError> {
    metrics::counter!("climate_requests_total", "route" => "tobs").increment(1);
    let config = &state.config.tobs;

    let station = if config.most_active {
        match state.repository.most_active_station().await? {
            Some(station) => station,
            None => return Ok(Json(Vec::new())),
        }
    } else {
        config.station.clone()
    };
    debug!("Reporting temperatures for {}", station);

    let rows = state
        .repository
        .station_temperatures(&station, config.limit)
        .await?;

    Ok(Json(flatten_pairs(rows.into_iter().map(|r| (r.date, r.tobs)))))
}
