//! Pure aggregation over already-fetched mood and trail-progress rows.
//!
//! Nothing in this module touches the database: handlers do the single
//! fetch per report and pass slices in, so every function here is
//! deterministic and testable with in-memory fixtures.

pub mod calendar;
pub mod mood;
pub mod report;
pub mod trails;
