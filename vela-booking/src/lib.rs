pub mod availability;
pub mod lifecycle;
pub mod reaper;

#[cfg(test)]
mod memory;

pub use availability::AvailabilityChecker;
pub use lifecycle::{CreateHoldRequest, LifecycleManager};
