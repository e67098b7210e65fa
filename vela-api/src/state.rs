use std::sync::Arc;
use vela_booking::{AvailabilityChecker, LifecycleManager};
use vela_catalog::ExtrasCatalog;
use vela_core::repository::{BoatRepository, ReservationRepository};

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<LifecycleManager>,
    pub availability: Arc<AvailabilityChecker>,
    pub boats: Arc<dyn BoatRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub extras: ExtrasCatalog,
}
