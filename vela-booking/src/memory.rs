//! In-memory store backing the unit tests. Mirrors the Postgres
//! repository's guard semantics: conditional transitions and an overlap
//! check at insert time under one lock, standing in for the database's
//! exclusion constraint.

use crate::availability::windows_overlap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use vela_core::boat::Boat;
use vela_core::error::ReservationError;
use vela_core::repository::{BoatRepository, ReservationFilter, ReservationRepository};
use vela_core::reservation::{
    NewReservation, PaymentStatus, Reservation, ReservationPatch, ReservationStatus,
};

struct Row {
    reservation: Reservation,
    buffered_start: DateTime<Utc>,
    buffered_end: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryStore {
    boats: Mutex<HashMap<String, Boat>>,
    reservations: Mutex<HashMap<Uuid, Row>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_boat(&self, boat: Boat) {
        self.boats.lock().unwrap().insert(boat.id.clone(), boat);
    }

    pub fn force_expiry(&self, id: Uuid, expires_at: DateTime<Utc>) {
        let mut rows = self.reservations.lock().unwrap();
        if let Some(row) = rows.get_mut(&id) {
            row.reservation.expires_at = Some(expires_at);
        }
    }

    pub fn get_status(&self, id: Uuid) -> Option<ReservationStatus> {
        self.reservations
            .lock()
            .unwrap()
            .get(&id)
            .map(|row| row.reservation.status)
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.lock().unwrap().len()
    }
}

#[async_trait]
impl BoatRepository for InMemoryStore {
    async fn get_boat(&self, id: &str) -> Result<Option<Boat>, ReservationError> {
        Ok(self.boats.lock().unwrap().get(id).cloned())
    }

    async fn list_active_boats(&self) -> Result<Vec<Boat>, ReservationError> {
        let mut boats: Vec<Boat> = self
            .boats
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.active)
            .cloned()
            .collect();
        boats.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(boats)
    }

    async fn create_boat(&self, boat: &Boat) -> Result<(), ReservationError> {
        let mut boats = self.boats.lock().unwrap();
        if boats.contains_key(&boat.id) {
            return Err(ReservationError::Validation(format!(
                "boat '{}' already exists",
                boat.id
            )));
        }
        boats.insert(boat.id.clone(), boat.clone());
        Ok(())
    }

    async fn update_boat(&self, boat: &Boat) -> Result<bool, ReservationError> {
        let mut boats = self.boats.lock().unwrap();
        if !boats.contains_key(&boat.id) {
            return Ok(false);
        }
        boats.insert(boat.id.clone(), boat.clone());
        Ok(true)
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn insert_hold(&self, new: &NewReservation) -> Result<Reservation, ReservationError> {
        let mut rows = self.reservations.lock().unwrap();

        let conflicts: Vec<Reservation> = rows
            .values()
            .filter(|row| {
                row.reservation.boat_id == new.boat_id
                    && row.reservation.status.is_active()
                    && windows_overlap(
                        row.buffered_start,
                        row.buffered_end,
                        new.buffered_start,
                        new.buffered_end,
                    )
            })
            .map(|row| row.reservation.clone())
            .collect();
        if !conflicts.is_empty() {
            return Err(ReservationError::Conflict { conflicts });
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: new.id,
            boat_id: new.boat_id.clone(),
            trip_date: new.trip_date,
            start_at: new.start_at,
            end_at: new.end_at,
            passenger_count: new.passenger_count,
            subtotal_cents: new.subtotal_cents,
            extras_cents: new.extras_cents,
            deposit_cents: new.deposit_cents,
            total_cents: new.total_cents,
            status: ReservationStatus::Hold,
            payment_status: PaymentStatus::Unpaid,
            session_token: new.session_token.clone(),
            expires_at: Some(new.expires_at),
            customer_name: new.customer_name.clone(),
            customer_email: new.customer_email.clone(),
            customer_phone: new.customer_phone.clone(),
            notes: new.notes.clone(),
            channel: new.channel,
            extras: new.extras.clone(),
            created_at: now,
            updated_at: now,
        };
        rows.insert(
            new.id,
            Row {
                reservation: reservation.clone(),
                buffered_start: new.buffered_start,
                buffered_end: new.buffered_end,
            },
        );
        Ok(reservation)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, ReservationError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .get(&id)
            .map(|row| row.reservation.clone()))
    }

    async fn find_conflicts(
        &self,
        boat_id: &str,
        buffered_start: DateTime<Utc>,
        buffered_end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let rows = self.reservations.lock().unwrap();
        let mut conflicts: Vec<Reservation> = rows
            .values()
            .filter(|row| {
                row.reservation.boat_id == boat_id
                    && row.reservation.status.is_active()
                    && Some(row.reservation.id) != exclude
                    && windows_overlap(
                        row.buffered_start,
                        row.buffered_end,
                        buffered_start,
                        buffered_end,
                    )
            })
            .map(|row| row.reservation.clone())
            .collect();
        conflicts.sort_by_key(|r| r.start_at);
        Ok(conflicts)
    }

    async fn advance_to_pending_payment(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ReservationError> {
        let mut rows = self.reservations.lock().unwrap();
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        let unexpired = row.reservation.expires_at.map(|t| t > now).unwrap_or(false);
        if row.reservation.status != ReservationStatus::Hold || !unexpired {
            return Ok(None);
        }
        row.reservation.status = ReservationStatus::PendingPayment;
        row.reservation.payment_status = PaymentStatus::Pending;
        row.reservation.expires_at = None;
        row.reservation.updated_at = now;
        Ok(Some(row.reservation.clone()))
    }

    async fn confirm(&self, id: Uuid) -> Result<Option<Reservation>, ReservationError> {
        let mut rows = self.reservations.lock().unwrap();
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if row.reservation.status != ReservationStatus::PendingPayment {
            return Ok(None);
        }
        row.reservation.status = ReservationStatus::Confirmed;
        row.reservation.payment_status = PaymentStatus::Paid;
        row.reservation.updated_at = Utc::now();
        Ok(Some(row.reservation.clone()))
    }

    async fn cancel(
        &self,
        id: Uuid,
        reason: Option<&str>,
    ) -> Result<Option<Reservation>, ReservationError> {
        let mut rows = self.reservations.lock().unwrap();
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if !row.reservation.status.is_active() {
            return Ok(None);
        }
        row.reservation.status = ReservationStatus::Cancelled;
        row.reservation.expires_at = None;
        if let Some(reason) = reason {
            let note = format!("cancelled: {}", reason);
            row.reservation.notes = Some(match row.reservation.notes.take() {
                Some(existing) => format!("{}\n{}", existing, note),
                None => note,
            });
        }
        row.reservation.updated_at = Utc::now();
        Ok(Some(row.reservation.clone()))
    }

    async fn update_fields(
        &self,
        id: Uuid,
        patch: &ReservationPatch,
        buffered: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Option<Reservation>, ReservationError> {
        let mut rows = self.reservations.lock().unwrap();
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(start) = patch.start_at {
            row.reservation.start_at = start;
            row.reservation.trip_date = start.date_naive();
        }
        if let Some(end) = patch.end_at {
            row.reservation.end_at = end;
        }
        if let Some((buffered_start, buffered_end)) = buffered {
            row.buffered_start = buffered_start;
            row.buffered_end = buffered_end;
        }
        if let Some(count) = patch.passenger_count {
            row.reservation.passenger_count = count;
        }
        if let Some(name) = &patch.customer_name {
            row.reservation.customer_name = Some(name.clone());
        }
        if let Some(email) = &patch.customer_email {
            row.reservation.customer_email = Some(email.clone());
        }
        if let Some(phone) = &patch.customer_phone {
            row.reservation.customer_phone = Some(phone.clone());
        }
        if let Some(notes) = &patch.notes {
            row.reservation.notes = Some(notes.clone());
        }
        if let Some(total) = patch.total_cents {
            row.reservation.total_cents = total;
        }
        row.reservation.updated_at = Utc::now();
        Ok(Some(row.reservation.clone()))
    }

    async fn expire_stale_holds(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, ReservationError> {
        let mut rows = self.reservations.lock().unwrap();
        let mut reaped = Vec::new();
        for row in rows.values_mut() {
            if row.reservation.status == ReservationStatus::Hold
                && row.reservation.expires_at.map(|t| t < now).unwrap_or(false)
            {
                row.reservation.status = ReservationStatus::Expired;
                row.reservation.updated_at = now;
                reaped.push(row.reservation.id);
            }
        }
        Ok(reaped)
    }

    async fn list(
        &self,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let rows = self.reservations.lock().unwrap();
        let mut result: Vec<Reservation> = rows
            .values()
            .filter(|row| {
                let r = &row.reservation;
                filter.boat_id.as_deref().map_or(true, |b| r.boat_id == b)
                    && filter.status.map_or(true, |s| r.status == s)
                    && filter.from.map_or(true, |d| r.trip_date >= d)
                    && filter.to.map_or(true, |d| r.trip_date <= d)
            })
            .map(|row| row.reservation.clone())
            .collect();
        result.sort_by_key(|r| r.start_at);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::season::SeasonTier;

    fn boat(id: &str) -> Boat {
        let mut price_table = HashMap::new();
        for tier in SeasonTier::all() {
            price_table.insert(tier, HashMap::from([(2, 11500_i64)]));
        }
        let now = Utc::now();
        Boat {
            id: id.to_string(),
            name: id.to_string(),
            capacity: 4,
            license_required: false,
            deposit_cents: 5000,
            active: true,
            price_table,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_boat_id_rejected() {
        let store = InMemoryStore::new();
        store.create_boat(&boat("solar-450")).await.unwrap();

        let err = store.create_boat(&boat("solar-450")).await.unwrap_err();
        assert!(matches!(err, ReservationError::Validation(_)));
    }
}
