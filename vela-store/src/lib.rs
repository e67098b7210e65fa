pub mod app_config;
pub mod boat_repo;
pub mod database;
pub mod reservation_repo;

pub use app_config::Config;
pub use boat_repo::PgBoatRepository;
pub use database::Db;
pub use reservation_repo::PgReservationRepository;

use vela_core::error::ReservationError;

/// Map a driver error into the domain's storage variant. Constraint
/// violations with richer meaning are handled before this at the call
/// sites that can see them.
pub(crate) fn storage_error(err: sqlx::Error) -> ReservationError {
    ReservationError::Storage(err.to_string())
}
