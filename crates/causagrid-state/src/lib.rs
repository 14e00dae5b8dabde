//! causagrid-state — embedded record store for Causagrid.
//!
//! Backed by [redb](https://docs.rs/redb), persists the case records
//! (work items), hourly/daily worker statistics, daily summaries, and
//! the fleet-manager singleton that the rest of the system coordinates
//! through.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value
//! columns. Composite keys (`{fuero}:{year}:{number}`,
//! `{date}:{hour}:{fuero}:{worker_type}`) enable prefix scans over
//! related records.
//!
//! redb admits a single write transaction at a time, so every
//! read-modify-write the store performs inside one transaction —
//! conditional lease writes, counter increments, bounded appends,
//! get-or-create upserts — is atomic with respect to every other
//! writer. That transaction is the only coordination primitive the
//! crates above this one rely on.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`) and can be shared across worker tasks.

pub mod alerts;
pub mod error;
pub mod period;
pub mod store;
pub mod tables;
pub mod types;

pub use alerts::{Alert, AlertKind, acknowledge, push_deduped};
pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
