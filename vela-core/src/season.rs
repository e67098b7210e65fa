use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// First and last calendar months of the operating season (inclusive).
pub const SEASON_OPENS_MONTH: u32 = 4;
pub const SEASON_CLOSES_MONTH: u32 = 10;

/// Price tier for a calendar date. Tiers carry strictly increasing prices
/// across the year: Low < Mid < High.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonTier {
    Low,
    Mid,
    High,
}

impl SeasonTier {
    /// All tiers a boat can operate in. Every active boat must price at
    /// least one duration bucket in each of these.
    pub fn all() -> [SeasonTier; 3] {
        [SeasonTier::Low, SeasonTier::Mid, SeasonTier::High]
    }
}

/// Whether the date falls inside the operating season at all.
pub fn in_operating_season(date: NaiveDate) -> bool {
    (SEASON_OPENS_MONTH..=SEASON_CLOSES_MONTH).contains(&date.month())
}

/// Map a date to its price tier. Returns `None` outside the operating season.
pub fn tier_for_date(date: NaiveDate) -> Option<SeasonTier> {
    match date.month() {
        4 | 5 | 10 => Some(SeasonTier::Low),
        6 | 9 => Some(SeasonTier::Mid),
        7 | 8 => Some(SeasonTier::High),
        _ => None,
    }
}
