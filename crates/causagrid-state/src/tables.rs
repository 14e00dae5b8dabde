//! redb table definitions for the Causagrid record store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized
//! domain types). Composite keys are colon-joined; components that
//! participate in prefix scans come first, and the hour component is
//! zero-padded so lexicographic order matches chronological order.

use redb::TableDefinition;

/// Case records keyed by `{fuero}:{year}:{number}[:{sub_docket}]`.
pub const CASES: TableDefinition<&str, &[u8]> = TableDefinition::new("cases");

/// Hourly worker stats keyed by `{date}:{hour:02}:{fuero}:{worker_type}`.
pub const HOURLY_STATS: TableDefinition<&str, &[u8]> = TableDefinition::new("hourly_stats");

/// Daily worker stats keyed by `{date}:{fuero}:{worker_type}`.
pub const DAILY_STATS: TableDefinition<&str, &[u8]> = TableDefinition::new("daily_stats");

/// Daily cross-fuero summaries keyed by `{date}:{worker_type}`.
pub const DAILY_SUMMARIES: TableDefinition<&str, &[u8]> = TableDefinition::new("daily_summaries");

/// Fleet manager singleton keyed by its logical name.
pub const MANAGER: TableDefinition<&str, &[u8]> = TableDefinition::new("manager");
