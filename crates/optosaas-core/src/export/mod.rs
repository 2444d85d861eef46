//! Report export for dashboards.

mod report;

pub use report::*;
