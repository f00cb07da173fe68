//! Temperature Summary Routes

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use storage::{aggregate, TemperatureSummary, WindowBounds};

use crate::{ApiError, AppState};

/// Min/avg/max temperature from `start` through the latest observation
pub async fn get_from_start(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureSummary>, ApiError> {
    metrics::counter!("climate_requests_total", "route" => "start").increment(1);

    let rows = state.repository.temperatures().await?;
    let summary = aggregate(rows, WindowBounds::starting_at(&start))?;
    Ok(Json(summary))
}

/// Min/avg/max temperature between `start` and `end`
pub async fn get_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureSummary>, ApiError> {
    metrics::counter!("climate_requests_total", "route" => "start_end").increment(1);

    let rows = state.repository.temperatures().await?;
    let bounds = WindowBounds::between(&start, &end, state.config.aggregate.end_inclusive);
    Ok(Json(aggregate(rows, bounds)?))
}
