use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use vela_core::repository::ReservationRepository;

/// Long-running background task that periodically releases capacity held
/// by abandoned checkouts. A failed sweep only delays release, so errors
/// are logged and the loop keeps going.
pub async fn start_hold_reaper(
    reservations: Arc<dyn ReservationRepository>,
    interval_seconds: u64,
) {
    info!("Hold reaper started, sweeping every {}s", interval_seconds);

    loop {
        sleep(Duration::from_secs(interval_seconds)).await;
        match vela_booking::reaper::sweep(reservations.as_ref()).await {
            Ok(_) => {}
            Err(e) => error!("Hold reaper sweep failed: {}", e),
        }
    }
}
