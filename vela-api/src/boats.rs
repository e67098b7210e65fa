use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use vela_catalog::validate_boat;
use vela_core::boat::{Boat, BoatSpec, PriceTable};
use vela_core::error::ReservationError;

#[derive(Debug, Serialize)]
pub struct BoatResponse {
    pub id: String,
    pub name: String,
    pub capacity: i32,
    pub license_required: bool,
    pub deposit_cents: i64,
    pub active: bool,
    pub price_table: PriceTable,
}

impl From<Boat> for BoatResponse {
    fn from(boat: Boat) -> Self {
        Self {
            id: boat.id,
            name: boat.name,
            capacity: boat.capacity,
            license_required: boat.license_required,
            deposit_cents: boat.deposit_cents,
            active: boat.active,
            price_table: boat.price_table,
        }
    }
}

fn boat_from_spec(spec: BoatSpec) -> Boat {
    let now = Utc::now();
    Boat {
        id: spec.id,
        name: spec.name,
        capacity: spec.capacity,
        license_required: spec.license_required,
        deposit_cents: spec.deposit_cents,
        active: spec.active,
        price_table: spec.price_table,
        created_at: now,
        updated_at: now,
    }
}

/// GET /v1/boats
pub async fn list_boats(
    State(state): State<AppState>,
) -> Result<Json<Vec<BoatResponse>>, ApiError> {
    let boats = state.boats.list_active_boats().await?;
    Ok(Json(boats.into_iter().map(BoatResponse::from).collect()))
}

/// POST /v1/admin/boats
pub async fn create_boat(
    State(state): State<AppState>,
    Json(spec): Json<BoatSpec>,
) -> Result<(StatusCode, Json<BoatResponse>), ApiError> {
    let boat = boat_from_spec(spec);
    validate_boat(&boat)?;
    state.boats.create_boat(&boat).await?;
    Ok((StatusCode::CREATED, Json(boat.into())))
}

#[derive(Debug, Serialize)]
pub struct ExtraCatalogEntry {
    pub name: String,
    pub unit_price_cents: i64,
}

/// GET /v1/extras
pub async fn list_extras(State(state): State<AppState>) -> Json<Vec<ExtraCatalogEntry>> {
    let entries = state
        .extras
        .entries()
        .into_iter()
        .map(|(name, unit_price_cents)| ExtraCatalogEntry {
            name,
            unit_price_cents,
        })
        .collect();
    Json(entries)
}

/// PUT /v1/admin/boats/{id}
/// Boats are never deleted; deactivation goes through here too.
pub async fn update_boat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut spec): Json<BoatSpec>,
) -> Result<Json<BoatResponse>, ApiError> {
    spec.id = id.clone();
    let boat = boat_from_spec(spec);
    validate_boat(&boat)?;
    let found = state.boats.update_boat(&boat).await?;
    if !found {
        return Err(ReservationError::NotFound(format!("boat {}", id)).into());
    }
    Ok(Json(boat.into()))
}
