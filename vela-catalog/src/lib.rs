pub mod extras;
pub mod pricing;
pub mod validation;

pub use extras::ExtrasCatalog;
pub use pricing::{price_breakdown, ExtraSelection, PriceBreakdown, DURATION_BUCKETS};
pub use validation::validate_boat;
