use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vela_booking::CreateHoldRequest;
use vela_catalog::{ExtraSelection, PriceBreakdown};
use vela_core::error::ReservationError;
use vela_core::repository::ReservationFilter;
use vela_core::reservation::{Channel, Reservation, ReservationPatch, ReservationStatus};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub boat_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub passenger_count: i32,
    #[serde(default)]
    pub extras: Vec<ExtraSelection>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub session_token: Option<String>,
    pub channel: Option<Channel>,
}

#[derive(Debug, Serialize)]
pub struct CreateReservationResponse {
    pub reservation_id: Uuid,
    pub status: String,
    pub breakdown: PriceBreakdown,
    pub hold_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub boat_id: String,
    pub boat_name: Option<String>,
    pub trip_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub passenger_count: i32,
    pub subtotal_cents: i64,
    pub extras_cents: i64,
    pub deposit_cents: i64,
    pub total_cents: i64,
    pub status: String,
    pub payment_status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub channel: String,
    pub extras: Vec<ExtraResponse>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ExtraResponse {
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

impl ReservationResponse {
    fn from_reservation(r: Reservation, boat_name: Option<String>) -> Self {
        Self {
            id: r.id,
            boat_id: r.boat_id,
            boat_name,
            trip_date: r.trip_date,
            start_time: r.start_at,
            end_time: r.end_at,
            passenger_count: r.passenger_count,
            subtotal_cents: r.subtotal_cents,
            extras_cents: r.extras_cents,
            deposit_cents: r.deposit_cents,
            total_cents: r.total_cents,
            status: r.status.as_str().to_string(),
            payment_status: r.payment_status.as_str().to_string(),
            expires_at: r.expires_at,
            customer_name: r.customer_name,
            customer_email: r.customer_email,
            customer_phone: r.customer_phone,
            notes: r.notes,
            channel: r.channel.as_str().to_string(),
            extras: r
                .extras
                .into_iter()
                .map(|e| ExtraResponse {
                    name: e.name,
                    unit_price_cents: e.unit_price_cents,
                    quantity: e.quantity,
                })
                .collect(),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub boat_id: Option<String>,
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/reservations
/// Quote the request and create a time-limited hold.
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<CreateReservationResponse>), ApiError> {
    let (reservation, breakdown) = state
        .lifecycle
        .create_hold(CreateHoldRequest {
            boat_id: req.boat_id,
            start_at: req.start_time,
            end_at: req.end_time,
            passenger_count: req.passenger_count,
            extras: req.extras,
            session_token: req.session_token,
            customer_name: req.customer_name,
            customer_email: req.customer_email,
            customer_phone: req.customer_phone,
            notes: req.notes,
            channel: req.channel.unwrap_or(Channel::Web),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateReservationResponse {
            reservation_id: reservation.id,
            status: reservation.status.as_str().to_string(),
            breakdown,
            hold_expires_at: reservation.expires_at,
        }),
    ))
}

/// GET /v1/reservations/{id}
/// Full record, including boat name and contact details, for the
/// notification and admin collaborators.
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state
        .reservations
        .get(id)
        .await?
        .ok_or_else(|| ReservationError::NotFound(format!("reservation {}", id)))?;

    let boat_name = state
        .boats
        .get_boat(&reservation.boat_id)
        .await?
        .map(|b| b.name);

    Ok(Json(ReservationResponse::from_reservation(
        reservation,
        boat_name,
    )))
}

/// GET /v1/reservations
/// Read-only reporting query by date range, status and boat.
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let status = match params.status.as_deref() {
        Some(s) => Some(ReservationStatus::parse(s).ok_or_else(|| {
            ReservationError::Validation(format!("unknown status '{}'", s))
        })?),
        None => None,
    };

    let reservations = state
        .reservations
        .list(&ReservationFilter {
            boat_id: params.boat_id,
            status,
            from: params.from,
            to: params.to,
        })
        .await?;

    Ok(Json(
        reservations
            .into_iter()
            .map(|r| ReservationResponse::from_reservation(r, None))
            .collect(),
    ))
}

/// POST /v1/reservations/{id}/advance
/// Hold -> PendingPayment, called when the payment collaborator opens a
/// payment intent.
pub async fn advance_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state.lifecycle.advance_to_pending_payment(id).await?;
    Ok(Json(ReservationResponse::from_reservation(reservation, None)))
}

/// POST /v1/reservations/{id}/confirm
/// PendingPayment -> Confirmed, on observed payment success.
pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state.lifecycle.confirm(id).await?;
    Ok(Json(ReservationResponse::from_reservation(reservation, None)))
}

/// POST /v1/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state.lifecycle.cancel(id, req.reason.as_deref()).await?;
    Ok(Json(ReservationResponse::from_reservation(reservation, None)))
}

/// PATCH /v1/reservations/{id}
/// Administrative correction path.
pub async fn patch_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ReservationPatch>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state.lifecycle.update_reservation(id, patch).await?;
    Ok(Json(ReservationResponse::from_reservation(reservation, None)))
}
