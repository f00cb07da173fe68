//! Precipitation Route

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use super::flatten_pairs;
use crate::config::PrecipitationWindow;
use crate::{ApiError, AppState};

/// Recent precipitation as `[date, prcp, ...]`, newest insertion first
pub async fn get_precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Value>>, ApiError> {
    metrics::counter!("climate_requests_total", "route" => "precipitation").increment(1);
    let config = &state.config.precipitation;

    let rows = match config.window {
        PrecipitationWindow::RowCount => state.repository.recent_precipitation(config.rows).await?,
        PrecipitationWindow::LastYear => state.repository.last_year_precipitation().await?,
    };

    Ok(Json(flatten_pairs(rows.into_iter().map(|r| (r.date, r.prcp)))))
}
