use crate::extras::ExtrasCatalog;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use vela_core::boat::Boat;
use vela_core::error::ReservationError;
use vela_core::reservation::ReservationExtra;
use vela_core::season;

/// The sellable rental lengths, in hours. Boats price a subset of these
/// per season tier.
pub const DURATION_BUCKETS: [u32; 6] = [1, 2, 3, 4, 6, 8];

/// A requested add-on. Quantity only; the unit price always comes from the
/// extras catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtraSelection {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub subtotal_cents: i64,
    pub extras_cents: i64,
    /// Refundable, itemized separately so downstream refunds can tell it
    /// apart from the rental price.
    pub deposit_cents: i64,
    pub total_cents: i64,
    pub season_tier: season::SeasonTier,
    pub bucket_hours: u32,
    pub extras: Vec<ReservationExtra>,
}

/// Requested rental length in whole hours. Partial hours round up, so a
/// 4h10m window prices as 5 hours.
pub fn rental_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let minutes = (end - start).num_minutes().max(0);
    ((minutes + 59) / 60) as u32
}

/// Smallest offered bucket that covers the requested hours; requests past
/// the largest bucket price at the largest. "Round up to the nearest
/// offered package", never prorated.
fn bucket_for(hours: u32, offered: &[u32]) -> Option<u32> {
    offered
        .iter()
        .copied()
        .find(|b| *b >= hours)
        .or_else(|| offered.last().copied())
}

/// Authoritative price for a rental. Pure and side-effect free; safe to
/// call speculatively before any reservation exists.
pub fn price_breakdown(
    boat: &Boat,
    date: NaiveDate,
    duration_hours: u32,
    selections: &[ExtraSelection],
    catalog: &ExtrasCatalog,
) -> Result<PriceBreakdown, ReservationError> {
    let tier = season::tier_for_date(date).ok_or_else(ReservationError::out_of_season)?;

    let offered = boat.buckets_for(tier);
    let bucket = bucket_for(duration_hours, &offered).ok_or(
        ReservationError::NoPriceForBucket {
            tier,
            hours: duration_hours,
        },
    )?;

    let subtotal_cents =
        boat.price_for(tier, bucket)
            .ok_or(ReservationError::NoPriceForBucket {
                tier,
                hours: bucket,
            })?;

    let mut extras = Vec::with_capacity(selections.len());
    let mut extras_cents: i64 = 0;
    for selection in selections {
        let unit_price_cents = catalog
            .unit_price_cents(&selection.name)
            .ok_or_else(|| ReservationError::UnknownExtra(selection.name.clone()))?;
        if selection.quantity < 1 {
            return Err(ReservationError::Validation(format!(
                "extra '{}' has non-positive quantity",
                selection.name
            )));
        }
        let extra = ReservationExtra {
            name: selection.name.clone(),
            unit_price_cents,
            quantity: selection.quantity,
        };
        extras_cents += extra.line_total_cents();
        extras.push(extra);
    }

    Ok(PriceBreakdown {
        subtotal_cents,
        extras_cents,
        deposit_cents: boat.deposit_cents,
        total_cents: subtotal_cents + extras_cents + boat.deposit_cents,
        season_tier: tier,
        bucket_hours: bucket,
        extras,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use vela_core::season::SeasonTier;

    fn boat_with_buckets(buckets: &[(u32, i64)]) -> Boat {
        let per_tier: HashMap<u32, i64> = buckets.iter().copied().collect();
        let mut price_table = HashMap::new();
        for tier in SeasonTier::all() {
            price_table.insert(tier, per_tier.clone());
        }
        let now = Utc::now();
        Boat {
            id: "solar-450".to_string(),
            name: "Solar 450".to_string(),
            capacity: 5,
            license_required: false,
            deposit_cents: 5000,
            active: true,
            price_table,
            created_at: now,
            updated_at: now,
        }
    }

    fn july(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    #[test]
    fn test_rounds_up_to_offered_bucket() {
        let boat = boat_with_buckets(&[(2, 11500), (4, 15000)]);
        let catalog = ExtrasCatalog::default();

        // 3 hours on a {2h, 4h} boat prices at the 4h package
        let breakdown = price_breakdown(&boat, july(10), 3, &[], &catalog).unwrap();
        assert_eq!(breakdown.bucket_hours, 4);
        assert_eq!(breakdown.subtotal_cents, 15000);
    }

    #[test]
    fn test_five_hours_prices_at_six_hour_bucket() {
        let boat = boat_with_buckets(&[(4, 20000), (6, 26000), (8, 30000)]);
        let catalog = ExtrasCatalog::default();

        let breakdown = price_breakdown(&boat, july(10), 5, &[], &catalog).unwrap();
        assert_eq!(breakdown.bucket_hours, 6);
        assert_eq!(breakdown.subtotal_cents, 26000);
    }

    #[test]
    fn test_overlong_request_uses_largest_bucket() {
        let boat = boat_with_buckets(&[(2, 11500), (4, 15000)]);
        let catalog = ExtrasCatalog::default();

        let breakdown = price_breakdown(&boat, july(10), 12, &[], &catalog).unwrap();
        assert_eq!(breakdown.bucket_hours, 4);
    }

    #[test]
    fn test_tier_with_no_buckets_has_no_price() {
        // Sells 2h rentals in Low and Mid but nothing in High
        let mut boat = boat_with_buckets(&[(2, 11500)]);
        boat.price_table.insert(SeasonTier::High, HashMap::new());
        let catalog = ExtrasCatalog::default();

        let err = price_breakdown(&boat, july(10), 2, &[], &catalog).unwrap_err();
        match err {
            ReservationError::NoPriceForBucket { tier, hours } => {
                assert_eq!(tier, SeasonTier::High);
                assert_eq!(hours, 2);
            }
            other => panic!("expected NoPriceForBucket, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_season_rejected() {
        let boat = boat_with_buckets(&[(2, 11500)]);
        let catalog = ExtrasCatalog::default();
        let december = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();

        let err = price_breakdown(&boat, december, 2, &[], &catalog).unwrap_err();
        assert!(matches!(err, ReservationError::OutOfSeason { .. }));
    }

    #[test]
    fn test_unknown_extra_rejected() {
        let boat = boat_with_buckets(&[(2, 11500)]);
        let catalog = ExtrasCatalog::default();
        let selection = ExtraSelection {
            name: "jetpack".to_string(),
            quantity: 1,
        };

        let err = price_breakdown(&boat, july(10), 2, &[selection], &catalog).unwrap_err();
        assert!(matches!(err, ReservationError::UnknownExtra(name) if name == "jetpack"));
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let boat = boat_with_buckets(&[(4, 15000)]);
        let catalog = ExtrasCatalog::default();
        let selections = vec![
            ExtraSelection {
                name: "cooler".to_string(),
                quantity: 1,
            },
            ExtraSelection {
                name: "snorkel-set".to_string(),
                quantity: 2,
            },
        ];

        let breakdown = price_breakdown(&boat, july(10), 4, &selections, &catalog).unwrap();
        assert_eq!(breakdown.extras_cents, 1000 + 2 * 1500);
        assert_eq!(
            breakdown.total_cents,
            breakdown.subtotal_cents + breakdown.extras_cents + breakdown.deposit_cents
        );
    }

    #[test]
    fn test_pricing_is_pure() {
        let boat = boat_with_buckets(&[(2, 11500), (4, 15000)]);
        let catalog = ExtrasCatalog::default();
        let selections = vec![ExtraSelection {
            name: "cooler".to_string(),
            quantity: 1,
        }];

        let first = price_breakdown(&boat, july(10), 3, &selections, &catalog).unwrap();
        let second = price_breakdown(&boat, july(10), 3, &selections, &catalog).unwrap();
        assert_eq!(first, second);

        // Changing only the extras changes only the extras total
        let bare = price_breakdown(&boat, july(10), 3, &[], &catalog).unwrap();
        assert_eq!(bare.subtotal_cents, first.subtotal_cents);
        assert_eq!(bare.deposit_cents, first.deposit_cents);
        assert_ne!(bare.extras_cents, first.extras_cents);
    }

    #[test]
    fn test_rental_hours_round_up() {
        let start = Utc.with_ymd_and_hms(2025, 7, 10, 10, 0, 0).unwrap();
        assert_eq!(rental_hours(start, start + chrono::Duration::hours(4)), 4);
        assert_eq!(
            rental_hours(start, start + chrono::Duration::minutes(250)),
            5
        );
        assert_eq!(rental_hours(start, start + chrono::Duration::minutes(61)), 2);
    }
}
