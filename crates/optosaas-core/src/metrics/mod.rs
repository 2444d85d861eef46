//! Performance metrics aggregation.
//!
//! Pipeline: Filter → Aggregate → Rank
//!
//! Aggregation is a pure function of `(records, staff, filter)`. It reads no
//! ambient state, never fails, and degrades to zero/empty values on missing
//! data, so dashboards render without error paths.

mod filter;
mod aggregator;
mod leaderboard;

pub use filter::*;
pub use aggregator::*;
pub use leaderboard::*;
