//! Side-by-side comparison: the bounded selection, the derived feature table
//! and its CSV export.

pub mod export;
pub mod generate;
pub mod set;

pub use export::{to_csv, PriceDisplay};
pub use generate::{generate, ComparisonSummary, ComparisonTable, FeatureRow, FeatureValue, Range};
pub use set::{AddOutcome, ComparisonSet, DEFAULT_MAX_ITEMS};
