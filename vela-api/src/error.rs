use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;
use vela_core::error::ReservationError;
use vela_core::reservation::Reservation;

#[derive(Debug)]
pub enum ApiError {
    Domain(ReservationError),
    Anyhow(anyhow::Error),
}

/// A competing reservation's window, as shown to the caller. Customer
/// details stay out of conflict payloads.
#[derive(Debug, Serialize)]
pub struct ConflictWindow {
    pub reservation_id: Uuid,
    pub boat_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
}

impl ConflictWindow {
    pub fn from_reservation(r: &Reservation) -> Self {
        Self {
            reservation_id: r.id,
            boat_id: r.boat_id.clone(),
            start_time: r.start_at,
            end_time: r.end_at,
            status: r.status.as_str().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Domain(err) => match &err {
                ReservationError::OutOfSeason { opens, closes } => (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "OUT_OF_SEASON",
                        "message": err.to_string(),
                        "season_opens_month": opens,
                        "season_closes_month": closes,
                    }),
                ),
                ReservationError::CapacityExceeded {
                    requested,
                    capacity,
                } => (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "CAPACITY_EXCEEDED",
                        "message": err.to_string(),
                        "requested": requested,
                        "capacity": capacity,
                    }),
                ),
                ReservationError::Conflict { conflicts } => {
                    let windows: Vec<ConflictWindow> = conflicts
                        .iter()
                        .map(ConflictWindow::from_reservation)
                        .collect();
                    (
                        StatusCode::CONFLICT,
                        json!({
                            "error": "CONFLICT",
                            "message": err.to_string(),
                            "conflicts": windows,
                        }),
                    )
                }
                ReservationError::UnknownExtra(_) | ReservationError::Validation(_) => (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "VALIDATION", "message": err.to_string() }),
                ),
                ReservationError::InvalidStateTransition { from, to } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({
                        "error": "INVALID_STATE_TRANSITION",
                        "message": err.to_string(),
                        "from": from,
                        "to": to,
                    }),
                ),
                ReservationError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    json!({ "error": "NOT_FOUND", "message": err.to_string() }),
                ),
                ReservationError::NoPriceForBucket { .. } => {
                    // Catalog data problem, not a caller mistake
                    tracing::error!("pricing data error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": "PRICING_UNAVAILABLE", "message": err.to_string() }),
                    )
                }
                ReservationError::Storage(msg) => {
                    tracing::error!("storage error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": "INTERNAL", "message": "internal server error" }),
                    )
                }
            },
            ApiError::Anyhow(err) => {
                tracing::error!("internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "INTERNAL", "message": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Anyhow(err)
    }
}
