use serde::Deserialize;

/// Operational knobs for the booking engine. Loaded from config; a single
/// set of values applies everywhere (the buffer in particular is one
/// constant, not environment-conditional logic).
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRules {
    /// Turnaround margin applied symmetrically to both ends of every
    /// window when testing for conflicts. Both sides of a comparison are
    /// expanded, so the clearance between two rentals is twice this value.
    pub buffer_minutes: i64,
    /// How long an unconsummated hold keeps its capacity.
    pub hold_ttl_minutes: i64,
    /// Reaper sweep cadence.
    pub reaper_interval_seconds: u64,
    /// Bounded retry for transient storage failures during create-hold.
    #[serde(default = "default_create_retries")]
    pub create_retry_attempts: u32,
}

fn default_create_retries() -> u32 {
    3
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            buffer_minutes: 20,
            hold_ttl_minutes: 30,
            reaper_interval_seconds: 60,
            create_retry_attempts: 3,
        }
    }
}
