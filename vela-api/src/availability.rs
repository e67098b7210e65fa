use crate::error::{ApiError, ConflictWindow};
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub boat_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    pub conflicts: Vec<ConflictWindow>,
}

/// POST /v1/availability
/// Pure probe; reports the competing windows without touching the
/// lifecycle.
pub async fn probe_availability(
    State(state): State<AppState>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let conflicts = state
        .availability
        .find_conflicts(&req.boat_id, req.start_time, req.end_time)
        .await?;

    Ok(Json(AvailabilityResponse {
        available: conflicts.is_empty(),
        conflicts: conflicts
            .iter()
            .map(ConflictWindow::from_reservation)
            .collect(),
    }))
}
