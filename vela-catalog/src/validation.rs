use crate::pricing::DURATION_BUCKETS;
use vela_core::boat::Boat;
use vela_core::error::ReservationError;
use vela_core::season::SeasonTier;

/// Admin-side validation for boat creates and updates. Rejects attribute
/// sets that would break pricing: non-positive capacity, negative deposit,
/// an operating-season tier with no sellable bucket, or a bucket outside
/// the fixed offered set.
pub fn validate_boat(boat: &Boat) -> Result<(), ReservationError> {
    if boat.id.trim().is_empty() {
        return Err(ReservationError::Validation("boat id is empty".to_string()));
    }
    if boat.capacity < 1 {
        return Err(ReservationError::Validation(format!(
            "capacity must be at least 1, got {}",
            boat.capacity
        )));
    }
    if boat.deposit_cents < 0 {
        return Err(ReservationError::Validation(
            "deposit must not be negative".to_string(),
        ));
    }

    for tier in SeasonTier::all() {
        let buckets = boat.buckets_for(tier);
        if buckets.is_empty() {
            return Err(ReservationError::Validation(format!(
                "price table defines no duration bucket for the {:?} season",
                tier
            )));
        }
        for bucket in buckets {
            if !DURATION_BUCKETS.contains(&bucket) {
                return Err(ReservationError::Validation(format!(
                    "{}h is not a sellable duration bucket",
                    bucket
                )));
            }
        }
        if let Some(prices) = boat.price_table.get(&tier) {
            if prices.values().any(|p| *p < 0) {
                return Err(ReservationError::Validation(format!(
                    "negative price in the {:?} season table",
                    tier
                )));
            }
        }
    }

    Ok(())
}
