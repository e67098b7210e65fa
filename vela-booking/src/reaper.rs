use chrono::Utc;
use uuid::Uuid;
use vela_core::error::ReservationError;
use vela_core::repository::ReservationRepository;

/// One reaper pass: move every hold whose expiry has passed to Expired.
///
/// The store does this as a single conditional bulk update, so the sweep
/// is idempotent and safe to run concurrently with itself — a row already
/// advanced or reaped no longer matches the guard.
pub async fn sweep(
    reservations: &dyn ReservationRepository,
) -> Result<Vec<Uuid>, ReservationError> {
    let now = Utc::now();
    let reaped = reservations.expire_stale_holds(now).await?;
    if !reaped.is_empty() {
        tracing::info!(count = reaped.len(), "reaped expired holds");
    }
    Ok(reaped)
}
