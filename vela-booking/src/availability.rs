use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use vela_core::error::ReservationError;
use vela_core::repository::ReservationRepository;
use vela_core::reservation::Reservation;

/// Expand a window symmetrically by the turnaround buffer. Stored windows
/// are expanded at write time and the requested window at probe time, so
/// the effective clearance between two rentals is twice `buffer_minutes`:
/// with the default 20, back-to-back bookings need a 40-minute gap.
pub fn buffered_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    buffer_minutes: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let buffer = Duration::minutes(buffer_minutes);
    (start - buffer, end + buffer)
}

/// Standard closed-interval overlap test.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Answers "can this boat take this window?" against the reservation
/// store. Only active reservations (hold, pending payment, confirmed)
/// count; cancelled and expired rows never block a booking.
pub struct AvailabilityChecker {
    reservations: Arc<dyn ReservationRepository>,
    buffer_minutes: i64,
}

impl AvailabilityChecker {
    pub fn new(reservations: Arc<dyn ReservationRepository>, buffer_minutes: i64) -> Self {
        Self {
            reservations,
            buffer_minutes,
        }
    }

    pub async fn is_available(
        &self,
        boat_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, ReservationError> {
        Ok(self.find_conflicts(boat_id, start, end).await?.is_empty())
    }

    /// The competing reservations themselves, for display to the caller.
    pub async fn find_conflicts(
        &self,
        boat_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, ReservationError> {
        if end <= start {
            return Err(ReservationError::Validation(
                "end time must be after start time".to_string(),
            ));
        }
        let (buffered_start, buffered_end) = buffered_window(start, end, self.buffer_minutes);
        self.reservations
            .find_conflicts(boat_id, buffered_start, buffered_end, None)
            .await
    }
}
