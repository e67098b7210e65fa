use crate::season::SeasonTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Seasonal price table: tier -> duration hours -> price in cents.
pub type PriceTable = HashMap<SeasonTier, HashMap<u32, i64>>;

/// A rentable boat. Boats are never deleted, only deactivated, so historic
/// reservations keep a valid reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boat {
    /// Stable slug, e.g. "solar-450".
    pub id: String,
    pub name: String,
    pub capacity: i32,
    pub license_required: bool,
    /// Refundable deposit, itemized separately from the rental price.
    pub deposit_cents: i64,
    pub active: bool,
    pub price_table: PriceTable,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Boat {
    /// Duration buckets the boat sells in the given tier, ascending.
    pub fn buckets_for(&self, tier: SeasonTier) -> Vec<u32> {
        let mut buckets: Vec<u32> = self
            .price_table
            .get(&tier)
            .map(|prices| prices.keys().copied().collect())
            .unwrap_or_default();
        buckets.sort_unstable();
        buckets
    }

    pub fn price_for(&self, tier: SeasonTier, bucket_hours: u32) -> Option<i64> {
        self.price_table.get(&tier)?.get(&bucket_hours).copied()
    }
}

/// Admin input for creating or replacing a boat's attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct BoatSpec {
    pub id: String,
    pub name: String,
    pub capacity: i32,
    #[serde(default)]
    pub license_required: bool,
    pub deposit_cents: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    pub price_table: PriceTable,
}

fn default_active() -> bool {
    true
}
