pub mod boat;
pub mod error;
pub mod repository;
pub mod reservation;
pub mod rules;
pub mod season;

pub use boat::{Boat, PriceTable};
pub use error::ReservationError;
pub use reservation::{
    Channel, NewReservation, PaymentStatus, Reservation, ReservationExtra, ReservationPatch,
    ReservationStatus,
};
pub use rules::BookingRules;
pub use season::SeasonTier;
