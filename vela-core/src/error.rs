use crate::reservation::Reservation;
use crate::season::{SeasonTier, SEASON_CLOSES_MONTH, SEASON_OPENS_MONTH};

/// The closed error taxonomy for the reservation engine. Every operation
/// returns one of these; nothing is swallowed inside the core.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("requested date is outside the operating season (months {opens}-{closes})")]
    OutOfSeason { opens: u32, closes: u32 },

    #[error("passenger count {requested} exceeds boat capacity {capacity}")]
    CapacityExceeded { requested: i32, capacity: i32 },

    /// Another active reservation occupies (part of) the buffered window.
    /// Carries the competitors so the caller can show them.
    #[error("requested window conflicts with {} existing reservation(s)", .conflicts.len())]
    Conflict { conflicts: Vec<Reservation> },

    #[error("unknown extra: {0}")]
    UnknownExtra(String),

    #[error("boat sells no {hours}h bucket in the {tier:?} season")]
    NoPriceForBucket { tier: SeasonTier, hours: u32 },

    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ReservationError {
    pub fn out_of_season() -> Self {
        ReservationError::OutOfSeason {
            opens: SEASON_OPENS_MONTH,
            closes: SEASON_CLOSES_MONTH,
        }
    }

    /// Only transient storage failures are worth retrying; everything else
    /// is definitive.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReservationError::Storage(_))
    }
}
