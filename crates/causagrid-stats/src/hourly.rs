//! Hourly reporting — per-case outcomes folded into (date, hour,
//! fuero, worker type) buckets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use causagrid_state::period::{business_date, business_hour};
use causagrid_state::{
    ErrorTally, ErrorType, Fuero, HourlyStat, SCALING_EVENTS_CAP, ScalingEvent, StateResult,
    StateStore, TOP_ERRORS_CAP, WorkerType,
};

/// How one case attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed,
    Skipped,
}

/// One case attempt, as reported by a worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub fuero: Fuero,
    pub worker_type: WorkerType,
    pub outcome: Outcome,
    /// New movimientos discovered by this attempt.
    pub movimientos_found: u64,
    /// Wall-clock time spent on the case, when measured.
    pub processing_time_ms: Option<u64>,
}

/// Writes worker reports into hourly buckets. The bucket is created
/// lazily on the first report of its hour; within the hour counters
/// only grow.
#[derive(Clone)]
pub struct HourlyRecorder {
    state: StateStore,
}

impl HourlyRecorder {
    pub fn new(state: StateStore) -> Self {
        Self { state }
    }

    /// Fold one case outcome into its hour's bucket.
    pub fn record(&self, report: &OutcomeReport, now: u64) -> StateResult<HourlyStat> {
        let date = business_date(now);
        let hour = business_hour(now);
        self.state.upsert_hourly(
            &date,
            hour,
            &report.fuero,
            &report.worker_type,
            now,
            |stat| {
                match report.outcome {
                    Outcome::Success => {
                        stat.stats.processed += 1;
                        stat.stats.successful += 1;
                    }
                    Outcome::Failed => {
                        stat.stats.processed += 1;
                        stat.stats.failed += 1;
                    }
                    Outcome::Skipped => stat.stats.skipped += 1,
                }
                stat.stats.movimientos_found += report.movimientos_found;
                if let Some(elapsed) = report.processing_time_ms {
                    stat.stats.total_processing_time_ms += elapsed;
                    stat.stats.min_processing_time_ms = Some(
                        stat.stats
                            .min_processing_time_ms
                            .map_or(elapsed, |m| m.min(elapsed)),
                    );
                    stat.stats.max_processing_time_ms = Some(
                        stat.stats
                            .max_processing_time_ms
                            .map_or(elapsed, |m| m.max(elapsed)),
                    );
                }
            },
        )
    }

    /// Tally one classified error against its hour's bucket. The tally
    /// list is bounded; once full, unseen error types are dropped
    /// rather than evicting established ones.
    pub fn record_error(
        &self,
        fuero: &str,
        worker_type: &str,
        error_type: ErrorType,
        message: &str,
        now: u64,
    ) -> StateResult<()> {
        let date = business_date(now);
        let hour = business_hour(now);
        self.state
            .upsert_hourly(&date, hour, fuero, worker_type, now, |stat| {
                if let Some(tally) = stat
                    .top_errors
                    .iter_mut()
                    .find(|t| t.error_type == error_type)
                {
                    tally.count += 1;
                    tally.last_message = message.to_string();
                } else if stat.top_errors.len() < TOP_ERRORS_CAP {
                    stat.top_errors.push(ErrorTally {
                        error_type,
                        count: 1,
                        last_message: message.to_string(),
                    });
                }
            })?;
        debug!(%fuero, error_type = error_type.as_str(), "hourly error tallied");
        Ok(())
    }

    /// Record one manager control-loop observation: worker-count
    /// gauges, the backlog snapshot, and any scaling decisions taken.
    pub fn record_manager_cycle(
        &self,
        fuero: &str,
        worker_type: &str,
        active_workers: u32,
        pending: u64,
        events: &[ScalingEvent],
        now: u64,
    ) -> StateResult<HourlyStat> {
        let date = business_date(now);
        let hour = business_hour(now);
        self.state
            .upsert_hourly(&date, hour, fuero, worker_type, now, |stat| {
                let cycles = stat.manager_cycles as f64;
                let avg = (stat.stats.avg_active_workers * cycles + active_workers as f64)
                    / (cycles + 1.0);
                stat.stats.avg_active_workers = (avg * 100.0).round() / 100.0;
                stat.manager_cycles += 1;
                stat.stats.max_active_workers = stat.stats.max_active_workers.max(active_workers);
                stat.stats.pending_at_end = Some(pending);
                stat.scaling_events.extend_from_slice(events);
                if stat.scaling_events.len() > SCALING_EVENTS_CAP {
                    let excess = stat.scaling_events.len() - SCALING_EVENTS_CAP;
                    stat.scaling_events.drain(..excess);
                }
            })
    }
}
