use crate::boat::Boat;
use crate::error::ReservationError;
use crate::reservation::{NewReservation, Reservation, ReservationPatch, ReservationStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Repository trait for boat catalog access.
#[async_trait]
pub trait BoatRepository: Send + Sync {
    async fn get_boat(&self, id: &str) -> Result<Option<Boat>, ReservationError>;

    async fn list_active_boats(&self) -> Result<Vec<Boat>, ReservationError>;

    async fn create_boat(&self, boat: &Boat) -> Result<(), ReservationError>;

    /// Returns false when the boat does not exist.
    async fn update_boat(&self, boat: &Boat) -> Result<bool, ReservationError>;
}

/// Reporting filter for read-only reservation queries.
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub boat_id: Option<String>,
    pub status: Option<ReservationStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Repository trait for reservation data access.
///
/// All mutation of reservation rows goes through these guarded operations;
/// no other component writes them. The guarded transition methods return
/// `None` when the row exists but its current state fails the guard, so the
/// lifecycle layer can report `InvalidStateTransition` with the real status.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a new hold together with its extras as one atomic unit.
    /// Fails with `Conflict` when another active reservation's buffered
    /// window overlaps — including when two concurrent inserts race.
    async fn insert_hold(&self, new: &NewReservation) -> Result<Reservation, ReservationError>;

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, ReservationError>;

    /// Active reservations whose buffered window intersects the given
    /// (already buffered) probe window.
    async fn find_conflicts(
        &self,
        boat_id: &str,
        buffered_start: DateTime<Utc>,
        buffered_end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Reservation>, ReservationError>;

    /// Hold -> PendingPayment, only while the hold is unexpired. Clears
    /// the expiry and marks payment as pending.
    async fn advance_to_pending_payment(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ReservationError>;

    /// PendingPayment -> Confirmed; marks payment as paid.
    async fn confirm(&self, id: Uuid) -> Result<Option<Reservation>, ReservationError>;

    /// Any active status -> Cancelled, recording the reason.
    async fn cancel(
        &self,
        id: Uuid,
        reason: Option<&str>,
    ) -> Result<Option<Reservation>, ReservationError>;

    /// Admin correction path. When the window moved the caller supplies the
    /// recomputed buffered bounds; the overlap constraint re-applies.
    async fn update_fields(
        &self,
        id: Uuid,
        patch: &ReservationPatch,
        buffered: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Option<Reservation>, ReservationError>;

    /// Bulk, idempotent sweep: every hold whose expiry is past `now` moves
    /// to Expired. Returns the reaped ids.
    async fn expire_stale_holds(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, ReservationError>;

    async fn list(
        &self,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>, ReservationError>;
}
