//! Domain types for the Causagrid record store.
//!
//! These types represent the persisted state of case records, hourly
//! and daily worker statistics, daily summaries, and the fleet-manager
//! singleton. All types are serializable to/from JSON for storage in
//! redb tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::alerts::Alert;

/// Jurisdiction/division code partitioning cases and statistics
/// (e.g. `CIV`, `COM`, `CNT`, `CSS`).
pub type Fuero = String;

/// Worker class reporting into the statistics tables
/// (e.g. `app-update`, `verify`, `recovery`).
pub type WorkerType = String;

/// Most recent update-history entries retained per case.
pub const UPDATE_HISTORY_CAP: usize = 200;

/// Scaling events retained per hourly row.
pub const SCALING_EVENTS_CAP: usize = 60;

/// Distinct error types tallied per hourly row.
pub const TOP_ERRORS_CAP: usize = 10;

/// Error log entries retained per daily row (FIFO).
pub const ERROR_LOG_CAP: usize = 100;

/// Manager history snapshots retained (24 h at one-minute cycles).
pub const HISTORY_CAP: usize = 1440;

/// Manager alerts retained (FIFO).
pub const ALERTS_CAP: usize = 100;

/// Logical key of the fleet-manager singleton record.
pub const MANAGER_KEY: &str = "app-update-manager";

// ── Case records ───────────────────────────────────────────────────

/// A case record subject to leased, cooldown-gated processing.
///
/// Created by ingestion, mutated by workers through conditional
/// updates, never deleted by this core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkItem {
    pub fuero: Fuero,
    pub year: u16,
    pub number: u32,
    /// Sub-docket (incidente) id, when the case has one.
    pub sub_docket: Option<String>,
    /// Provenance tag (`scraping`, `scraping-capsolver`, `app`, …).
    pub source: String,
    pub verified: bool,
    pub is_valid: bool,
    pub needs_update: bool,
    /// Unix timestamp (seconds) of the last successful refresh.
    pub last_update: u64,
    pub movimientos_count: u32,
    /// Exclusive claim, if any. An expired lease is treated as absent.
    pub lease: Option<Lease>,
    pub cooldown: CooldownState,
    /// Append-only update log, trimmed to the most recent
    /// [`UPDATE_HISTORY_CAP`] entries.
    pub update_history: Vec<UpdateRecord>,
    /// Per-business-day update counter feeding the summary's
    /// top-causas ranking.
    pub daily_updates: DailyUpdateCounter,
    pub created_at: u64,
}

impl WorkItem {
    pub fn new(
        fuero: impl Into<Fuero>,
        year: u16,
        number: u32,
        source: impl Into<String>,
        now: u64,
    ) -> Self {
        Self {
            fuero: fuero.into(),
            year,
            number,
            sub_docket: None,
            source: source.into(),
            verified: false,
            is_valid: false,
            needs_update: false,
            last_update: now,
            movimientos_count: 0,
            lease: None,
            cooldown: CooldownState::default(),
            update_history: Vec::new(),
            daily_updates: DailyUpdateCounter::default(),
            created_at: now,
        }
    }

    /// Build the composite key for the cases table.
    pub fn table_key(&self) -> String {
        match &self.sub_docket {
            Some(sub) => format!("{}:{}:{}:{}", self.fuero, self.year, self.number, sub),
            None => format!("{}:{}:{}", self.fuero, self.year, self.number),
        }
    }

    /// Whether a lease exists whose `expires_at` is still in the future.
    pub fn has_live_lease(&self, now: u64) -> bool {
        self.lease.as_ref().is_some_and(|l| !l.is_expired(now))
    }

    /// Append an update-history entry and roll the per-day counter,
    /// trimming the log to its cap.
    pub fn record_update(&mut self, record: UpdateRecord, date: &str) {
        if self.daily_updates.date != date {
            self.daily_updates = DailyUpdateCounter {
                date: date.to_string(),
                count: 0,
            };
        }
        self.daily_updates.count += 1;
        self.update_history.push(record);
        if self.update_history.len() > UPDATE_HISTORY_CAP {
            let excess = self.update_history.len() - UPDATE_HISTORY_CAP;
            self.update_history.drain(..excess);
        }
    }
}

/// A time-bounded exclusive claim on a case, held by one worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lease {
    pub worker_id: String,
    pub locked_at: u64,
    pub expires_at: u64,
}

impl Lease {
    /// A lease whose expiry has passed is not live and must be treated
    /// as absent.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now
    }
}

/// Per-case failure counter and backoff window. Advisory state only:
/// consumed by the eligibility selector, never blocking.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CooldownState {
    pub consecutive_errors: u32,
    pub last_error_type: Option<ErrorType>,
    pub last_error_at: Option<u64>,
    /// The case is excluded from selection until this instant.
    pub skip_until: Option<u64>,
}

impl CooldownState {
    pub fn is_parked(&self, now: u64) -> bool {
        self.skip_until.is_some_and(|until| until > now)
    }
}

/// One entry in a case's update-history log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateRecord {
    pub timestamp: u64,
    pub source: String,
    pub update_type: UpdateType,
    pub success: bool,
    pub movimientos_added: u32,
    pub movimientos_total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    Create,
    Update,
    Verify,
    Error,
}

/// Rolling per-day update counter on a case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyUpdateCounter {
    /// Business-timezone date the counter belongs to (`YYYY-MM-DD`).
    pub date: String,
    pub count: u32,
}

/// Classified worker failure reported into cooldown and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    CaptchaFailed,
    LoginFailed,
    Timeout,
    NetworkError,
    ParseError,
    NotFound,
    PrivateCausa,
    DatabaseError,
    Unknown,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CaptchaFailed => "captcha_failed",
            Self::LoginFailed => "login_failed",
            Self::Timeout => "timeout",
            Self::NetworkError => "network_error",
            Self::ParseError => "parse_error",
            Self::NotFound => "not_found",
            Self::PrivateCausa => "private_causa",
            Self::DatabaseError => "database_error",
            Self::Unknown => "unknown",
        }
    }
}

// ── Hourly statistics ──────────────────────────────────────────────

/// Build the hourly-stats composite key. The hour is zero-padded so
/// lexicographic order matches chronological order within a day.
pub fn hourly_key(date: &str, hour: u8, fuero: &str, worker_type: &str) -> String {
    format!("{date}:{hour:02}:{fuero}:{worker_type}")
}

/// One (date, hour, fuero, worker type) statistics bucket.
///
/// Created lazily on the first report for its key; counters only
/// increase within the hour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyStat {
    pub date: String,
    pub hour: u8,
    pub fuero: Fuero,
    pub worker_type: WorkerType,
    pub stats: HourlyCounters,
    /// Manager control-loop cycles observed during this hour.
    pub manager_cycles: u64,
    /// Scaling decisions taken during this hour (bounded).
    pub scaling_events: Vec<ScalingEvent>,
    /// Per-error-type tallies for the hour (bounded).
    pub top_errors: Vec<ErrorTally>,
    pub last_update: u64,
    pub created_at: u64,
}

impl HourlyStat {
    pub fn new(date: &str, hour: u8, fuero: &str, worker_type: &str, now: u64) -> Self {
        Self {
            date: date.to_string(),
            hour,
            fuero: fuero.to_string(),
            worker_type: worker_type.to_string(),
            stats: HourlyCounters::default(),
            manager_cycles: 0,
            scaling_events: Vec::new(),
            top_errors: Vec::new(),
            last_update: now,
            created_at: now,
        }
    }

    pub fn table_key(&self) -> String {
        hourly_key(&self.date, self.hour, &self.fuero, &self.worker_type)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HourlyCounters {
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
    pub movimientos_found: u64,
    pub total_processing_time_ms: u64,
    pub min_processing_time_ms: Option<u64>,
    pub max_processing_time_ms: Option<u64>,
    /// Peak concurrent workers observed during the hour.
    pub max_active_workers: u32,
    /// Running average of workers across manager cycles.
    pub avg_active_workers: f64,
    /// Backlog gauge as of the latest manager cycle.
    pub pending_at_end: Option<u64>,
}

/// A scaling decision recorded against the hour it happened in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalingEvent {
    pub timestamp: u64,
    pub action: ScaleAction,
    pub from: u32,
    pub to: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleAction {
    ScaleUp,
    ScaleDown,
    NoChange,
}

/// Per-error-type tally within an hourly bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorTally {
    pub error_type: ErrorType,
    pub count: u64,
    pub last_message: String,
}

// ── Daily statistics ───────────────────────────────────────────────

/// Build the daily-stats composite key.
pub fn daily_key(date: &str, fuero: &str, worker_type: &str) -> String {
    format!("{date}:{fuero}:{worker_type}")
}

/// One (date, fuero, worker type) daily ledger: accumulated counters,
/// individual runs, a capped error log, and deduplicated alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStat {
    pub date: String,
    pub fuero: Fuero,
    pub worker_type: WorkerType,
    pub stats: DailyCounters,
    pub runs: Vec<Run>,
    /// Most recent errors, capped at [`ERROR_LOG_CAP`] (oldest dropped).
    pub errors: Vec<ErrorEntry>,
    pub status: DayStatus,
    pub alerts: Vec<Alert>,
    pub last_update: u64,
    pub created_at: u64,
}

impl DailyStat {
    pub fn new(date: &str, fuero: &str, worker_type: &str, now: u64) -> Self {
        Self {
            date: date.to_string(),
            fuero: fuero.to_string(),
            worker_type: worker_type.to_string(),
            stats: DailyCounters::default(),
            runs: Vec::new(),
            errors: Vec::new(),
            status: DayStatus::Pending,
            alerts: Vec::new(),
            last_update: now,
            created_at: now,
        }
    }

    pub fn table_key(&self) -> String {
        daily_key(&self.date, &self.fuero, &self.worker_type)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyCounters {
    /// Eligible backlog at the start of the day's first run.
    pub total_to_process: u64,
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
    pub movimientos_found: u64,
    pub captcha_attempts: u64,
    pub captcha_successful: u64,
    pub captcha_failed: u64,
    pub total_processing_time_ms: u64,
}

/// One worker execution within a day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub started_at: u64,
    pub finished_at: Option<u64>,
    pub duration_ms: Option<u64>,
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub movimientos_found: u64,
    pub status: RunStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Interrupted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Partial,
    Failed,
}

/// One entry in a daily error log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEntry {
    pub timestamp: u64,
    /// Key of the case the error occurred on, when known.
    pub case_key: Option<String>,
    pub error_type: ErrorType,
    pub message: String,
    pub retry_count: u32,
}

// ── Daily summary ──────────────────────────────────────────────────

/// Build the daily-summary composite key.
pub fn summary_key(date: &str, worker_type: &str) -> String {
    format!("{date}:{worker_type}")
}

/// Derived, recomputable cross-fuero view of one day. Never a source
/// of truth; safe to regenerate idempotently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySummary {
    pub date: String,
    pub worker_type: WorkerType,
    pub totals: SummaryTotals,
    pub by_fuero: Vec<FueroBreakdown>,
    /// All 24 hour slots, in order.
    pub hourly_distribution: Vec<HourSlot>,
    /// Cases with the most updates this day, descending.
    pub top_causas: Vec<TopCausa>,
    /// Most frequent error types this day, descending.
    pub top_errors: Vec<TopError>,
    pub status: DayStatus,
    pub alerts_count: u32,
    pub has_unacknowledged_alerts: bool,
    /// Day-over-day comparison; absent when no prior summary exists.
    pub comparison: Option<DayComparison>,
    pub generated_at: u64,
}

impl DailySummary {
    pub fn table_key(&self) -> String {
        summary_key(&self.date, &self.worker_type)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryTotals {
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub movimientos_found: u64,
    pub avg_processing_time_ms: u64,
    /// Percentage 0–100.
    pub success_rate: u32,
    /// Distinct hours with activity.
    pub total_working_hours: u32,
    pub first_activity_hour: Option<u8>,
    pub last_activity_hour: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FueroBreakdown {
    pub fuero: Fuero,
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub movimientos_found: u64,
    pub avg_processing_time_ms: u64,
    /// Percentage 0–100.
    pub success_rate: u32,
    pub active_hours: Vec<u8>,
    pub peak_hour: Option<u8>,
    pub peak_hour_processed: u64,
    pub max_workers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourSlot {
    pub hour: u8,
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub movimientos_found: u64,
    pub avg_workers: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopCausa {
    pub case_key: String,
    pub fuero: Fuero,
    pub update_count: u32,
    pub movimientos_total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopError {
    pub error_type: ErrorType,
    pub count: u64,
    /// Percentage of all logged errors, 0–100.
    pub percentage: u32,
    pub example_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayComparison {
    /// Percentage change in processed count vs the previous day.
    pub processed_change_pct: i64,
    /// Percentage change in movimientos found vs the previous day.
    pub movimientos_change_pct: i64,
    /// Rounded delta in success-rate percentage points.
    pub success_rate_change: i64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

// ── Fleet manager ──────────────────────────────────────────────────

/// The fleet-manager singleton: scaling configuration, the latest
/// control-loop snapshot, bounded history, and alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManagerState {
    /// Logical key; only one record exists.
    pub name: String,
    pub config: ScalingConfig,
    pub current: CurrentState,
    /// Ring of the most recent [`HISTORY_CAP`] snapshots.
    pub history: Vec<StateSnapshot>,
    /// Most recent [`ALERTS_CAP`] alerts.
    pub alerts: Vec<Alert>,
    pub last_update: u64,
    pub created_at: u64,
}

impl ManagerState {
    pub fn new(now: u64) -> Self {
        Self {
            name: MANAGER_KEY.to_string(),
            config: ScalingConfig::default(),
            current: CurrentState::default(),
            history: Vec::new(),
            alerts: Vec::new(),
            last_update: now,
            created_at: now,
        }
    }
}

/// Scaling thresholds and working-hours window. Persisted inside the
/// manager singleton and passed explicitly — never ambient state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalingConfig {
    pub check_interval_secs: u64,
    pub max_workers: u32,
    pub min_workers: u32,
    /// Backlog above which one worker is added.
    pub scale_threshold: u64,
    /// Backlog below which one worker is removed.
    pub scale_down_threshold: u64,
    /// Cases refreshed longer ago than this are eligible again.
    pub update_threshold_hours: u64,
    /// CPU usage (0.0–1.0) above which scale-up is withheld.
    pub cpu_threshold: f64,
    /// Memory usage (0.0–1.0) above which scale-up is withheld.
    pub memory_threshold: f64,
    pub work_start_hour: u8,
    pub work_end_hour: u8,
    /// Working weekdays, Monday = 1 … Sunday = 7.
    pub work_days: Vec<u8>,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            max_workers: 3,
            min_workers: 0,
            scale_threshold: 500,
            scale_down_threshold: 50,
            update_threshold_hours: 12,
            cpu_threshold: 0.75,
            memory_threshold: 0.80,
            work_start_hour: 8,
            work_end_hour: 22,
            work_days: vec![1, 2, 3, 4, 5],
        }
    }
}

/// Typed partial update for [`ScalingConfig`]. Fields left `None`
/// keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScalingConfigPatch {
    pub check_interval_secs: Option<u64>,
    pub max_workers: Option<u32>,
    pub min_workers: Option<u32>,
    pub scale_threshold: Option<u64>,
    pub scale_down_threshold: Option<u64>,
    pub update_threshold_hours: Option<u64>,
    pub cpu_threshold: Option<f64>,
    pub memory_threshold: Option<f64>,
    pub work_start_hour: Option<u8>,
    pub work_end_hour: Option<u8>,
    pub work_days: Option<Vec<u8>>,
}

impl ScalingConfigPatch {
    pub fn apply(&self, config: &mut ScalingConfig) {
        if let Some(v) = self.check_interval_secs {
            config.check_interval_secs = v;
        }
        if let Some(v) = self.max_workers {
            config.max_workers = v;
        }
        if let Some(v) = self.min_workers {
            config.min_workers = v;
        }
        if let Some(v) = self.scale_threshold {
            config.scale_threshold = v;
        }
        if let Some(v) = self.scale_down_threshold {
            config.scale_down_threshold = v;
        }
        if let Some(v) = self.update_threshold_hours {
            config.update_threshold_hours = v;
        }
        if let Some(v) = self.cpu_threshold {
            config.cpu_threshold = v;
        }
        if let Some(v) = self.memory_threshold {
            config.memory_threshold = v;
        }
        if let Some(v) = self.work_start_hour {
            config.work_start_hour = v;
        }
        if let Some(v) = self.work_end_hour {
            config.work_end_hour = v;
        }
        if let Some(v) = &self.work_days {
            config.work_days = v.clone();
        }
    }
}

/// Latest control-loop observation, overwritten each cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CurrentState {
    /// Running workers per fuero, as reported by the process supervisor.
    pub workers: HashMap<Fuero, u32>,
    /// Eligible backlog per fuero.
    pub pending: HashMap<Fuero, u64>,
    /// Recommended worker count per fuero.
    pub optimal_workers: HashMap<Fuero, u32>,
    pub resources: Option<ResourceReadings>,
    pub is_running: bool,
    pub is_within_working_hours: bool,
    pub last_cycle_at: Option<u64>,
    pub cycle_count: u64,
}

/// Externally sampled system resource readings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceReadings {
    /// 0.0–1.0.
    pub cpu_usage: f64,
    /// 0.0–1.0.
    pub memory_usage: f64,
    pub free_memory_mb: u64,
    pub total_memory_mb: u64,
}

/// One history entry of the manager's bounded ring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateSnapshot {
    pub timestamp: u64,
    pub workers: HashMap<Fuero, u32>,
    pub pending: HashMap<Fuero, u64>,
    pub resources: Option<ResourceReadings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_key_with_and_without_sub_docket() {
        let mut item = WorkItem::new("CIV", 2026, 48213, "scraping", 0);
        assert_eq!(item.table_key(), "CIV:2026:48213");
        item.sub_docket = Some("2".to_string());
        assert_eq!(item.table_key(), "CIV:2026:48213:2");
    }

    #[test]
    fn expired_lease_is_not_live() {
        let mut item = WorkItem::new("CIV", 2026, 1, "scraping", 0);
        item.lease = Some(Lease {
            worker_id: "w-1".to_string(),
            locked_at: 100,
            expires_at: 400,
        });
        assert!(item.has_live_lease(399));
        assert!(!item.has_live_lease(400));
        assert!(!item.has_live_lease(500));
    }

    #[test]
    fn update_history_is_trimmed_and_daily_counter_rolls() {
        let mut item = WorkItem::new("COM", 2025, 7, "scraping", 0);
        let record = UpdateRecord {
            timestamp: 1,
            source: "scraping".to_string(),
            update_type: UpdateType::Update,
            success: true,
            movimientos_added: 1,
            movimientos_total: 10,
        };
        for _ in 0..(UPDATE_HISTORY_CAP + 5) {
            item.record_update(record.clone(), "2026-03-14");
        }
        assert_eq!(item.update_history.len(), UPDATE_HISTORY_CAP);
        assert_eq!(item.daily_updates.count, (UPDATE_HISTORY_CAP + 5) as u32);

        item.record_update(record, "2026-03-15");
        assert_eq!(item.daily_updates.date, "2026-03-15");
        assert_eq!(item.daily_updates.count, 1);
    }

    #[test]
    fn hourly_key_is_zero_padded() {
        assert_eq!(
            hourly_key("2026-03-14", 8, "CIV", "app-update"),
            "2026-03-14:08:CIV:app-update"
        );
        assert!(
            hourly_key("2026-03-14", 9, "CIV", "app-update")
                < hourly_key("2026-03-14", 13, "CIV", "app-update")
        );
    }

    #[test]
    fn config_patch_applies_only_set_fields() {
        let mut config = ScalingConfig::default();
        let patch = ScalingConfigPatch {
            max_workers: Some(5),
            scale_threshold: Some(900),
            ..ScalingConfigPatch::default()
        };
        patch.apply(&mut config);
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.scale_threshold, 900);
        // Untouched fields keep defaults.
        assert_eq!(config.min_workers, 0);
        assert_eq!(config.work_days, vec![1, 2, 3, 4, 5]);
    }
}
