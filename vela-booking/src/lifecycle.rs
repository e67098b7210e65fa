use crate::availability::buffered_window;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;
use vela_catalog::{price_breakdown, ExtraSelection, ExtrasCatalog, PriceBreakdown};
use vela_core::boat::Boat;
use vela_core::error::ReservationError;
use vela_core::repository::{BoatRepository, ReservationRepository};
use vela_core::reservation::{
    Channel, NewReservation, Reservation, ReservationPatch, ReservationStatus,
};
use vela_core::rules::BookingRules;

/// A quote-and-hold request as it reaches the engine, already shaped by
/// the transport layer.
#[derive(Debug, Clone)]
pub struct CreateHoldRequest {
    pub boat_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub passenger_count: i32,
    pub extras: Vec<ExtraSelection>,
    pub session_token: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub channel: Channel,
}

/// Owns every reservation state transition. All writes to reservation
/// rows in the system go through this manager's guarded operations.
pub struct LifecycleManager {
    boats: Arc<dyn BoatRepository>,
    reservations: Arc<dyn ReservationRepository>,
    extras_catalog: ExtrasCatalog,
    rules: BookingRules,
}

impl LifecycleManager {
    pub fn new(
        boats: Arc<dyn BoatRepository>,
        reservations: Arc<dyn ReservationRepository>,
        extras_catalog: ExtrasCatalog,
        rules: BookingRules,
    ) -> Self {
        Self {
            boats,
            reservations,
            extras_catalog,
            rules,
        }
    }

    /// Price the request and atomically create a time-limited hold.
    ///
    /// The store enforces the no-overlap invariant at insert time, so two
    /// racing requests for the same window cannot both succeed; the loser
    /// gets `Conflict` with the winner's window attached. Only transient
    /// storage failures are retried, a bounded number of times.
    pub async fn create_hold(
        &self,
        req: CreateHoldRequest,
    ) -> Result<(Reservation, PriceBreakdown), ReservationError> {
        let boat = self.active_boat(&req.boat_id).await?;
        let (new, breakdown) = self.build_hold(&boat, &req, Utc::now())?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.reservations.insert_hold(&new).await {
                Ok(reservation) => {
                    tracing::info!(
                        reservation_id = %reservation.id,
                        boat_id = %reservation.boat_id,
                        expires_at = ?reservation.expires_at,
                        "hold created"
                    );
                    return Ok((reservation, breakdown));
                }
                Err(err) if err.is_transient() && attempt < self.rules.create_retry_attempts => {
                    tracing::warn!(
                        boat_id = %new.boat_id,
                        attempt,
                        error = %err,
                        "transient storage error creating hold, retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Validate and price a request without touching the store's write
    /// path. Everything here is deterministic for a given clock instant.
    fn build_hold(
        &self,
        boat: &Boat,
        req: &CreateHoldRequest,
        now: DateTime<Utc>,
    ) -> Result<(NewReservation, PriceBreakdown), ReservationError> {
        if req.end_at <= req.start_at {
            return Err(ReservationError::Validation(
                "end time must be after start time".to_string(),
            ));
        }
        if req.passenger_count < 1 {
            return Err(ReservationError::Validation(
                "passenger count must be at least 1".to_string(),
            ));
        }
        if req.passenger_count > boat.capacity {
            return Err(ReservationError::CapacityExceeded {
                requested: req.passenger_count,
                capacity: boat.capacity,
            });
        }

        let trip_date = req.start_at.date_naive();
        let hours = vela_catalog::pricing::rental_hours(req.start_at, req.end_at);
        let breakdown = price_breakdown(boat, trip_date, hours, &req.extras, &self.extras_catalog)?;

        let (buffered_start, buffered_end) =
            buffered_window(req.start_at, req.end_at, self.rules.buffer_minutes);

        let new = NewReservation {
            id: Uuid::new_v4(),
            boat_id: boat.id.clone(),
            trip_date,
            start_at: req.start_at,
            end_at: req.end_at,
            buffered_start,
            buffered_end,
            passenger_count: req.passenger_count,
            subtotal_cents: breakdown.subtotal_cents,
            extras_cents: breakdown.extras_cents,
            deposit_cents: breakdown.deposit_cents,
            total_cents: breakdown.total_cents,
            session_token: req.session_token.clone(),
            expires_at: now + chrono::Duration::minutes(self.rules.hold_ttl_minutes),
            customer_name: req.customer_name.clone(),
            customer_email: req.customer_email.clone(),
            customer_phone: req.customer_phone.clone(),
            notes: req.notes.clone(),
            channel: req.channel,
            extras: breakdown.extras.clone(),
        };
        Ok((new, breakdown))
    }

    /// Hold -> PendingPayment, legal only while the hold is unexpired.
    /// From here the reservation is resolved solely by confirm or cancel;
    /// it never auto-expires.
    pub async fn advance_to_pending_payment(
        &self,
        id: Uuid,
    ) -> Result<Reservation, ReservationError> {
        let now = Utc::now();
        match self.reservations.advance_to_pending_payment(id, now).await? {
            Some(reservation) => Ok(reservation),
            None => Err(self
                .transition_failure(id, ReservationStatus::PendingPayment, now)
                .await?),
        }
    }

    /// PendingPayment -> Confirmed, on payment success.
    pub async fn confirm(&self, id: Uuid) -> Result<Reservation, ReservationError> {
        match self.reservations.confirm(id).await? {
            Some(reservation) => {
                tracing::info!(reservation_id = %id, "reservation confirmed");
                Ok(reservation)
            }
            None => Err(self
                .transition_failure(id, ReservationStatus::Confirmed, Utc::now())
                .await?),
        }
    }

    /// Cancel from any non-terminal state. Re-cancelling an already
    /// cancelled reservation is a no-op success.
    pub async fn cancel(
        &self,
        id: Uuid,
        reason: Option<&str>,
    ) -> Result<Reservation, ReservationError> {
        if let Some(reservation) = self.reservations.cancel(id, reason).await? {
            tracing::info!(reservation_id = %id, "reservation cancelled");
            return Ok(reservation);
        }
        let current = self
            .reservations
            .get(id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("reservation {}", id)))?;
        if current.status == ReservationStatus::Cancelled {
            return Ok(current);
        }
        Err(ReservationError::InvalidStateTransition {
            from: current.status.as_str().to_string(),
            to: ReservationStatus::Cancelled.as_str().to_string(),
        })
    }

    /// Administrative correction path. Window moves re-validate the
    /// no-overlap invariant (excluding the reservation itself) before the
    /// store re-applies its constraint.
    pub async fn update_reservation(
        &self,
        id: Uuid,
        patch: ReservationPatch,
    ) -> Result<Reservation, ReservationError> {
        let current = self
            .reservations
            .get(id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("reservation {}", id)))?;

        if let Some(count) = patch.passenger_count {
            let boat = self.active_boat(&current.boat_id).await?;
            if count < 1 {
                return Err(ReservationError::Validation(
                    "passenger count must be at least 1".to_string(),
                ));
            }
            if count > boat.capacity {
                return Err(ReservationError::CapacityExceeded {
                    requested: count,
                    capacity: boat.capacity,
                });
            }
        }

        let buffered = if patch.moves_window() {
            let start = patch.start_at.unwrap_or(current.start_at);
            let end = patch.end_at.unwrap_or(current.end_at);
            if end <= start {
                return Err(ReservationError::Validation(
                    "end time must be after start time".to_string(),
                ));
            }
            let (buffered_start, buffered_end) =
                buffered_window(start, end, self.rules.buffer_minutes);
            if current.status.is_active() {
                let conflicts = self
                    .reservations
                    .find_conflicts(&current.boat_id, buffered_start, buffered_end, Some(id))
                    .await?;
                if !conflicts.is_empty() {
                    return Err(ReservationError::Conflict { conflicts });
                }
            }
            Some((buffered_start, buffered_end))
        } else {
            None
        };

        self.reservations
            .update_fields(id, &patch, buffered)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("reservation {}", id)))
    }

    async fn active_boat(&self, boat_id: &str) -> Result<Boat, ReservationError> {
        let boat = self
            .boats
            .get_boat(boat_id)
            .await?
            .filter(|b| b.active)
            .ok_or_else(|| ReservationError::NotFound(format!("boat {}", boat_id)))?;
        Ok(boat)
    }

    /// A guarded transition matched no row; work out which typed error
    /// that means.
    async fn transition_failure(
        &self,
        id: Uuid,
        to: ReservationStatus,
        now: DateTime<Utc>,
    ) -> Result<ReservationError, ReservationError> {
        let current = self
            .reservations
            .get(id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("reservation {}", id)))?;
        // A hold past its expiry is as good as reaped, even if the sweep
        // has not run yet.
        let from = if current.is_expired_hold(now) {
            ReservationStatus::Expired
        } else {
            current.status
        };
        Ok(ReservationError::InvalidStateTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}
