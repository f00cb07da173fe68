//! Station Route

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Distinct station identifiers, sorted ascending
pub async fn get_stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    metrics::counter!("climate_requests_total", "route" => "stations").increment(1);
    Ok(Json(state.repository.stations().await?))
}
