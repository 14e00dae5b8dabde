//! StateStore — redb-backed persistence for Causagrid.
//!
//! Provides typed operations over case records, hourly/daily stats,
//! daily summaries, and the fleet-manager singleton. All values are
//! JSON-serialized into redb's `&[u8]` value columns. The store
//! supports both on-disk and in-memory backends (the latter for
//! testing).
//!
//! redb serializes write transactions, so the `mutate` primitive —
//! read, apply a closure, write back, all inside one write
//! transaction — gives every caller atomic conditional updates,
//! atomic increments, bounded appends, and race-free get-or-create.
//! Dozens of workers reporting into the same key simply serialize
//! through it; no read-modify-write ever happens outside a write
//! transaction.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

type Table = TableDefinition<'static, &'static str, &'static [u8]>;

/// Thread-safe record store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "record store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory record store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(CASES).map_err(map_err!(Table))?;
        txn.open_table(HOURLY_STATS).map_err(map_err!(Table))?;
        txn.open_table(DAILY_STATS).map_err(map_err!(Table))?;
        txn.open_table(DAILY_SUMMARIES).map_err(map_err!(Table))?;
        txn.open_table(MANAGER).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic primitives ─────────────────────────────────────────

    fn read<T: DeserializeOwned>(&self, table: Table, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let value = serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, table: Table, key: &str, value: &T) -> StateResult<()> {
        let bytes = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            table
                .insert(key, bytes.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Atomic read-modify-write on one record inside a single write
    /// transaction. The closure receives the current value (if any)
    /// and returns the value to store, or `None` to leave the record
    /// untouched. Returns the stored value.
    fn mutate<T, F>(&self, table: Table, key: &str, f: F) -> StateResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> Option<T>,
    {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let stored;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            let current: Option<T> = match table.get(key).map_err(map_err!(Read))? {
                Some(guard) => {
                    Some(serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?)
                }
                None => None,
            };
            match f(current) {
                Some(updated) => {
                    let bytes = serde_json::to_vec(&updated).map_err(map_err!(Serialize))?;
                    table
                        .insert(key, bytes.as_slice())
                        .map_err(map_err!(Write))?;
                    stored = Some(updated);
                }
                None => stored = None,
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(stored)
    }

    /// Range scan over keys sharing a prefix, in key order.
    fn scan_prefix<T: DeserializeOwned>(&self, table: Table, prefix: &str) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.range(prefix..).map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if !key.value().starts_with(prefix) {
                break;
            }
            let item = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(item);
        }
        Ok(results)
    }

    // ── Cases ──────────────────────────────────────────────────────

    /// Insert or overwrite a case record.
    pub fn put_case(&self, item: &WorkItem) -> StateResult<()> {
        let key = item.table_key();
        self.write(CASES, &key, item)?;
        debug!(%key, "case stored");
        Ok(())
    }

    /// Get a case by its composite key.
    pub fn get_case(&self, key: &str) -> StateResult<Option<WorkItem>> {
        self.read(CASES, key)
    }

    /// Atomic conditional update of one case. The closure mutates the
    /// record in place and returns whether to persist the change;
    /// `Ok(false)` means the case was absent or the closure declined.
    ///
    /// This is the test-then-set primitive lease acquisition and
    /// cooldown transitions are built on.
    pub fn update_case<F>(&self, key: &str, f: F) -> StateResult<bool>
    where
        F: FnOnce(&mut WorkItem) -> bool,
    {
        let stored = self.mutate(CASES, key, |current: Option<WorkItem>| {
            let mut item = current?;
            f(&mut item).then_some(item)
        })?;
        Ok(stored.is_some())
    }

    /// List all cases of a fuero, in key order.
    pub fn list_cases(&self, fuero: &str) -> StateResult<Vec<WorkItem>> {
        self.scan_prefix(CASES, &format!("{fuero}:"))
    }

    // ── Hourly stats ───────────────────────────────────────────────

    /// Get-or-create the bucket for (date, hour, fuero, worker type)
    /// and apply `f` to it, all inside one write transaction. Safe
    /// for concurrent first calls on a brand-new period key.
    pub fn upsert_hourly<F>(
        &self,
        date: &str,
        hour: u8,
        fuero: &str,
        worker_type: &str,
        now: u64,
        f: F,
    ) -> StateResult<HourlyStat>
    where
        F: FnOnce(&mut HourlyStat),
    {
        let key = hourly_key(date, hour, fuero, worker_type);
        let stored = self.mutate(HOURLY_STATS, &key, |current: Option<HourlyStat>| {
            let mut stat =
                current.unwrap_or_else(|| HourlyStat::new(date, hour, fuero, worker_type, now));
            f(&mut stat);
            stat.last_update = now;
            Some(stat)
        })?;
        // The closure always returns Some.
        stored.ok_or_else(|| StateError::Write(format!("hourly upsert produced nothing: {key}")))
    }

    /// Get an hourly bucket by key.
    pub fn get_hourly(&self, key: &str) -> StateResult<Option<HourlyStat>> {
        self.read(HOURLY_STATS, key)
    }

    /// All hourly buckets of a date, hour order, optionally filtered
    /// by worker type.
    pub fn list_hourly_for_date(
        &self,
        date: &str,
        worker_type: Option<&str>,
    ) -> StateResult<Vec<HourlyStat>> {
        let mut rows: Vec<HourlyStat> = self.scan_prefix(HOURLY_STATS, &format!("{date}:"))?;
        if let Some(wt) = worker_type {
            rows.retain(|r| r.worker_type == wt);
        }
        Ok(rows)
    }

    // ── Daily stats ────────────────────────────────────────────────

    /// Get-or-create the ledger for (date, fuero, worker type) and
    /// apply `f`, all inside one write transaction.
    pub fn upsert_daily<F>(
        &self,
        date: &str,
        fuero: &str,
        worker_type: &str,
        now: u64,
        f: F,
    ) -> StateResult<DailyStat>
    where
        F: FnOnce(&mut DailyStat),
    {
        let key = daily_key(date, fuero, worker_type);
        let stored = self.mutate(DAILY_STATS, &key, |current: Option<DailyStat>| {
            let mut stat = current.unwrap_or_else(|| DailyStat::new(date, fuero, worker_type, now));
            f(&mut stat);
            stat.last_update = now;
            Some(stat)
        })?;
        stored.ok_or_else(|| StateError::Write(format!("daily upsert produced nothing: {key}")))
    }

    /// Get a daily ledger by key.
    pub fn get_daily(&self, key: &str) -> StateResult<Option<DailyStat>> {
        self.read(DAILY_STATS, key)
    }

    /// All daily ledgers of a date, optionally filtered by worker type.
    pub fn list_daily_for_date(
        &self,
        date: &str,
        worker_type: Option<&str>,
    ) -> StateResult<Vec<DailyStat>> {
        let mut rows: Vec<DailyStat> = self.scan_prefix(DAILY_STATS, &format!("{date}:"))?;
        if let Some(wt) = worker_type {
            rows.retain(|r| r.worker_type == wt);
        }
        Ok(rows)
    }

    /// Daily ledgers within an inclusive date range, newest first.
    pub fn list_daily_range(
        &self,
        from_date: &str,
        to_date: &str,
        fuero: Option<&str>,
        worker_type: Option<&str>,
    ) -> StateResult<Vec<DailyStat>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(DAILY_STATS).map_err(map_err!(Table))?;
        // Keys are `{date}:{fuero}:{worker_type}`; `~` sorts after every
        // key character, so this bounds the scan at the end of `to_date`.
        let upper = format!("{to_date}:~");
        let mut results: Vec<DailyStat> = Vec::new();
        for entry in table.range(from_date..).map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value() > upper.as_str() {
                break;
            }
            let stat: DailyStat =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            if fuero.is_some_and(|f| f != stat.fuero) {
                continue;
            }
            if worker_type.is_some_and(|wt| wt != stat.worker_type) {
                continue;
            }
            results.push(stat);
        }
        results.reverse();
        Ok(results)
    }

    // ── Daily summaries ────────────────────────────────────────────

    /// Upsert a summary, replacing any stored one wholesale.
    pub fn put_summary(&self, summary: &DailySummary) -> StateResult<()> {
        let key = summary.table_key();
        self.write(DAILY_SUMMARIES, &key, summary)?;
        debug!(%key, "daily summary stored");
        Ok(())
    }

    /// Get the summary for (date, worker type).
    pub fn get_summary(&self, date: &str, worker_type: &str) -> StateResult<Option<DailySummary>> {
        self.read(DAILY_SUMMARIES, &summary_key(date, worker_type))
    }

    // ── Manager singleton ──────────────────────────────────────────

    /// Get the manager record, creating it with default config on
    /// first call. The get-or-create runs in one write transaction,
    /// so concurrent first calls produce exactly one record.
    pub fn get_or_create_manager(&self, now: u64) -> StateResult<ManagerState> {
        let stored = self.mutate(MANAGER, MANAGER_KEY, |current: Option<ManagerState>| {
            Some(current.unwrap_or_else(|| ManagerState::new(now)))
        })?;
        stored.ok_or_else(|| StateError::Write("manager upsert produced nothing".into()))
    }

    /// Get the manager record without creating it.
    pub fn get_manager(&self) -> StateResult<Option<ManagerState>> {
        self.read(MANAGER, MANAGER_KEY)
    }

    /// Atomically mutate the manager record (created if absent).
    pub fn update_manager<F>(&self, now: u64, f: F) -> StateResult<ManagerState>
    where
        F: FnOnce(&mut ManagerState),
    {
        let stored = self.mutate(MANAGER, MANAGER_KEY, |current: Option<ManagerState>| {
            let mut manager = current.unwrap_or_else(|| ManagerState::new(now));
            f(&mut manager);
            manager.last_update = now;
            Some(manager)
        })?;
        stored.ok_or_else(|| StateError::Write("manager update produced nothing".into()))
    }
}
