//! causagrid-stats — three-tier worker statistics.
//!
//! Workers report individual case outcomes into hourly buckets
//! ([`HourlyRecorder`]), runs and accumulated counters into daily
//! ledgers ([`DailyLedger`]), and a periodic job condenses a whole day
//! into one cross-fuero summary ([`SummaryBuilder`]).
//!
//! All three tiers write through the store's single-writer
//! transactions, so any number of workers can report into the same
//! period bucket concurrently without losing increments.

pub mod daily;
pub mod hourly;
pub mod summary;

pub use daily::{DailyDelta, DailyLedger, RunId, RunReport};
pub use hourly::{HourlyRecorder, Outcome, OutcomeReport};
pub use summary::SummaryBuilder;
