//! Daily ledger — per (date, fuero, worker type) runs, accumulated
//! counters, a bounded error log, and alert rules.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use causagrid_state::{
    ALERTS_CAP, Alert, AlertKind, DailyStat, DayStatus, ERROR_LOG_CAP, ErrorEntry, ErrorType, Run,
    RunStatus, StateResult, StateStore, acknowledge, daily_key, push_deduped,
};

/// Handle to one run within a day's ledger, returned by
/// [`DailyLedger::start_run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunId(usize);

/// Incremental progress folded into the day's counters and the
/// current run. Fields left at zero add nothing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DailyDelta {
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
    pub movimientos_found: u64,
    pub captcha_attempts: u64,
    pub captcha_successful: u64,
    pub captcha_failed: u64,
    pub processing_time_ms: u64,
}

/// Final counts reported when a run closes, folded into both the run
/// record and the day's totals. A count belongs either here or in the
/// incremental [`DailyDelta`] stream, never both; callers reporting
/// incrementally close with [`RunReport::default`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub movimientos_found: u64,
    pub processing_time_ms: u64,
}

/// Alert thresholds on a day's counters. Rates only fire once the
/// denominators carry enough volume to be meaningful.
const ERROR_RATE_THRESHOLD: f64 = 0.10;
const ERROR_RATE_MIN_PROCESSED: u64 = 10;
const CAPTCHA_FAIL_THRESHOLD: f64 = 0.20;
const CAPTCHA_MIN_ATTEMPTS: u64 = 5;

/// Store-backed daily ledger.
#[derive(Clone)]
pub struct DailyLedger {
    state: StateStore,
}

impl DailyLedger {
    pub fn new(state: StateStore) -> Self {
        Self { state }
    }

    /// Open a new run in the day's ledger. `total_to_process` records
    /// the eligible backlog at the start of the day; it is only set by
    /// the first run that supplies it.
    pub fn start_run(
        &self,
        date: &str,
        fuero: &str,
        worker_type: &str,
        total_to_process: Option<u64>,
        now: u64,
    ) -> StateResult<RunId> {
        let mut index = 0;
        self.state
            .upsert_daily(date, fuero, worker_type, now, |stat| {
                if let Some(total) = total_to_process {
                    if stat.stats.total_to_process == 0 {
                        stat.stats.total_to_process = total;
                    }
                }
                stat.runs.push(Run {
                    started_at: now,
                    finished_at: None,
                    duration_ms: None,
                    processed: 0,
                    successful: 0,
                    failed: 0,
                    movimientos_found: 0,
                    status: RunStatus::Running,
                    error_message: None,
                });
                index = stat.runs.len() - 1;
                stat.status = DayStatus::InProgress;
            })?;
        debug!(%date, %fuero, run = index, "run started");
        Ok(RunId(index))
    }

    /// Fold incremental progress into the day's counters and the run.
    pub fn add(
        &self,
        date: &str,
        fuero: &str,
        worker_type: &str,
        run: RunId,
        delta: &DailyDelta,
        now: u64,
    ) -> StateResult<DailyStat> {
        let delta = *delta;
        self.state
            .upsert_daily(date, fuero, worker_type, now, |stat| {
                stat.stats.processed += delta.processed;
                stat.stats.successful += delta.successful;
                stat.stats.failed += delta.failed;
                stat.stats.skipped += delta.skipped;
                stat.stats.movimientos_found += delta.movimientos_found;
                stat.stats.captcha_attempts += delta.captcha_attempts;
                stat.stats.captcha_successful += delta.captcha_successful;
                stat.stats.captcha_failed += delta.captcha_failed;
                stat.stats.total_processing_time_ms += delta.processing_time_ms;
                if let Some(run) = stat.runs.get_mut(run.0) {
                    run.processed += delta.processed;
                    run.successful += delta.successful;
                    run.failed += delta.failed;
                    run.movimientos_found += delta.movimientos_found;
                }
            })
    }

    /// Close a run with its terminal status, folding any final counts
    /// from `report` into the run record and the day's totals, then
    /// re-derive the day's status and evaluate the alert rules.
    #[allow(clippy::too_many_arguments)]
    pub fn finish_run(
        &self,
        date: &str,
        fuero: &str,
        worker_type: &str,
        run: RunId,
        status: RunStatus,
        error_message: Option<String>,
        report: &RunReport,
        now: u64,
    ) -> StateResult<DailyStat> {
        let report = *report;
        let stat = self
            .state
            .upsert_daily(date, fuero, worker_type, now, |stat| {
                match stat.runs.get_mut(run.0) {
                    Some(entry) => {
                        entry.finished_at = Some(now);
                        entry.duration_ms = Some(now.saturating_sub(entry.started_at) * 1000);
                        entry.status = status;
                        entry.error_message = error_message.clone();
                        entry.processed += report.processed;
                        entry.successful += report.successful;
                        entry.failed += report.failed;
                        entry.movimientos_found += report.movimientos_found;
                        stat.stats.processed += report.processed;
                        stat.stats.successful += report.successful;
                        stat.stats.failed += report.failed;
                        stat.stats.movimientos_found += report.movimientos_found;
                        stat.stats.total_processing_time_ms += report.processing_time_ms;
                    }
                    None => warn!(%date, %fuero, run = run.0, "finish for unknown run"),
                }
                stat.status = derive_day_status(stat);
                raise_alerts(stat, fuero, now);
            })?;
        debug!(%date, %fuero, run = run.0, ?status, "run finished");
        Ok(stat)
    }

    /// Append an error to the day's bounded log and count the failure
    /// against the day's totals. Failures reported here must not also
    /// be counted through [`add`](Self::add).
    #[allow(clippy::too_many_arguments)]
    pub fn log_error(
        &self,
        date: &str,
        fuero: &str,
        worker_type: &str,
        case_key: Option<String>,
        error_type: ErrorType,
        message: &str,
        retry_count: u32,
        now: u64,
    ) -> StateResult<()> {
        self.state
            .upsert_daily(date, fuero, worker_type, now, |stat| {
                stat.errors.push(ErrorEntry {
                    timestamp: now,
                    case_key: case_key.clone(),
                    error_type,
                    message: message.to_string(),
                    retry_count,
                });
                if stat.errors.len() > ERROR_LOG_CAP {
                    let excess = stat.errors.len() - ERROR_LOG_CAP;
                    stat.errors.drain(..excess);
                }
                stat.stats.failed += 1;
            })?;
        Ok(())
    }

    /// Unacknowledged alerts on a day's ledger.
    pub fn active_alerts(
        &self,
        date: &str,
        fuero: &str,
        worker_type: &str,
    ) -> StateResult<Vec<Alert>> {
        let stat = self.state.get_daily(&daily_key(date, fuero, worker_type))?;
        Ok(stat
            .map(|s| s.alerts.into_iter().filter(|a| !a.acknowledged).collect())
            .unwrap_or_default())
    }

    /// Acknowledge a day's alerts, optionally restricted to one kind.
    /// Returns how many alerts changed state.
    pub fn acknowledge_alerts(
        &self,
        date: &str,
        fuero: &str,
        worker_type: &str,
        kind: Option<AlertKind>,
        now: u64,
    ) -> StateResult<usize> {
        let mut changed = 0;
        self.state
            .upsert_daily(date, fuero, worker_type, now, |stat| {
                changed = acknowledge(&mut stat.alerts, kind);
            })?;
        Ok(changed)
    }
}

fn derive_day_status(stat: &DailyStat) -> DayStatus {
    if stat.runs.iter().any(|r| r.status == RunStatus::Running) {
        return DayStatus::InProgress;
    }
    let failed_runs = stat.runs.iter().filter(|r| r.status == RunStatus::Failed).count();
    let completed_runs = stat
        .runs
        .iter()
        .filter(|r| r.status == RunStatus::Completed)
        .count();
    if failed_runs > 0 && completed_runs == 0 {
        return DayStatus::Failed;
    }
    if failed_runs > 0 {
        return DayStatus::Partial;
    }
    if stat.stats.total_to_process > 0 && stat.stats.processed >= stat.stats.total_to_process {
        return DayStatus::Completed;
    }
    DayStatus::Partial
}

fn raise_alerts(stat: &mut DailyStat, fuero: &str, now: u64) {
    let counters = &stat.stats;
    if counters.processed > ERROR_RATE_MIN_PROCESSED {
        let rate = counters.failed as f64 / counters.processed as f64;
        if rate > ERROR_RATE_THRESHOLD {
            let alert = Alert::new(
                AlertKind::HighErrorRate,
                format!(
                    "{} of {} cases failed ({:.0}%)",
                    counters.failed,
                    counters.processed,
                    rate * 100.0
                ),
                now,
            )
            .for_fuero(fuero);
            push_deduped(&mut stat.alerts, alert, ALERTS_CAP);
        }
    }
    if counters.captcha_attempts > CAPTCHA_MIN_ATTEMPTS {
        let rate = counters.captcha_failed as f64 / counters.captcha_attempts as f64;
        if rate > CAPTCHA_FAIL_THRESHOLD {
            let alert = Alert::new(
                AlertKind::CaptchaIssues,
                format!(
                    "{} of {} captcha attempts failed ({:.0}%)",
                    counters.captcha_failed,
                    counters.captcha_attempts,
                    rate * 100.0
                ),
                now,
            )
            .for_fuero(fuero);
            push_deduped(&mut stat.alerts, alert, ALERTS_CAP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "2026-03-16";

    fn fixture() -> (StateStore, DailyLedger) {
        let store = StateStore::open_in_memory().unwrap();
        let ledger = DailyLedger::new(store.clone());
        (store, ledger)
    }

    #[test]
    fn run_lifecycle_reaches_completed_day() {
        let (_, ledger) = fixture();
        let run = ledger
            .start_run(DATE, "CIV", "app-update", Some(20), 1000)
            .unwrap();

        ledger
            .add(
                DATE,
                "CIV",
                "app-update",
                run,
                &DailyDelta {
                    processed: 20,
                    successful: 19,
                    failed: 1,
                    movimientos_found: 35,
                    processing_time_ms: 40_000,
                    ..DailyDelta::default()
                },
                1500,
            )
            .unwrap();

        let stat = ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                run,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                2000,
            )
            .unwrap();

        assert_eq!(stat.status, DayStatus::Completed);
        assert_eq!(stat.stats.processed, 20);
        assert_eq!(stat.stats.total_to_process, 20);
        let finished = &stat.runs[0];
        assert_eq!(finished.status, RunStatus::Completed);
        assert_eq!(finished.finished_at, Some(2000));
        assert_eq!(finished.duration_ms, Some(1_000_000));
        assert_eq!(finished.processed, 20);
    }

    #[test]
    fn finishing_with_final_counts_folds_them_into_run_and_day() {
        let (_, ledger) = fixture();
        let run = ledger
            .start_run(DATE, "CIV", "app-update", Some(120), 1000)
            .unwrap();

        // No incremental deltas: everything arrives with the closing report.
        let stat = ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                run,
                RunStatus::Completed,
                None,
                &RunReport {
                    processed: 120,
                    successful: 105,
                    failed: 15,
                    movimientos_found: 200,
                    processing_time_ms: 240_000,
                },
                2000,
            )
            .unwrap();

        let finished = &stat.runs[0];
        assert_eq!(finished.processed, 120);
        assert_eq!(finished.successful, 105);
        assert_eq!(finished.failed, 15);
        assert_eq!(finished.movimientos_found, 200);

        assert_eq!(stat.stats.processed, 120);
        assert_eq!(stat.stats.successful, 105);
        assert_eq!(stat.stats.failed, 15);
        assert_eq!(stat.stats.movimientos_found, 200);
        assert_eq!(stat.stats.total_processing_time_ms, 240_000);
        assert_eq!(stat.status, DayStatus::Completed);
        // The closing counts feed the alert rules too: 15/120 > 10%.
        assert_eq!(stat.alerts.len(), 1);
        assert_eq!(stat.alerts[0].kind, AlertKind::HighErrorRate);
    }

    #[test]
    fn total_to_process_is_set_once() {
        let (_, ledger) = fixture();
        let first = ledger
            .start_run(DATE, "CIV", "app-update", Some(100), 1000)
            .unwrap();
        ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                first,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1100,
            )
            .unwrap();
        let second = ledger
            .start_run(DATE, "CIV", "app-update", Some(40), 1200)
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                second,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1300,
            )
            .unwrap();
        assert_eq!(stat.stats.total_to_process, 100);
    }

    #[test]
    fn all_failed_runs_mark_the_day_failed_and_one_success_makes_partial() {
        let (_, ledger) = fixture();
        let run = ledger
            .start_run(DATE, "COM", "app-update", Some(50), 1000)
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "COM",
                "app-update",
                run,
                RunStatus::Failed,
                Some("browser crashed".to_string()),
                &RunReport::default(),
                1100,
            )
            .unwrap();
        assert_eq!(stat.status, DayStatus::Failed);
        assert_eq!(stat.runs[0].error_message.as_deref(), Some("browser crashed"));

        let retry = ledger
            .start_run(DATE, "COM", "app-update", None, 1200)
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "COM",
                "app-update",
                retry,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1300,
            )
            .unwrap();
        assert_eq!(stat.status, DayStatus::Partial);
    }

    #[test]
    fn high_error_rate_alert_fires_once_and_after_ack_again() {
        let (_, ledger) = fixture();
        let run = ledger
            .start_run(DATE, "CIV", "app-update", Some(100), 1000)
            .unwrap();
        ledger
            .add(
                DATE,
                "CIV",
                "app-update",
                run,
                &DailyDelta {
                    processed: 50,
                    successful: 40,
                    failed: 10,
                    ..DailyDelta::default()
                },
                1100,
            )
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                run,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1200,
            )
            .unwrap();
        assert_eq!(stat.alerts.len(), 1);
        assert_eq!(stat.alerts[0].kind, AlertKind::HighErrorRate);
        assert_eq!(stat.alerts[0].fuero.as_deref(), Some("CIV"));

        // A second finish does not duplicate the open alert.
        let again = ledger
            .start_run(DATE, "CIV", "app-update", None, 1300)
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                again,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1400,
            )
            .unwrap();
        assert_eq!(stat.alerts.len(), 1);

        // Acknowledged, the rule may fire anew.
        assert_eq!(
            ledger
                .acknowledge_alerts(DATE, "CIV", "app-update", None, 1500)
                .unwrap(),
            1
        );
        assert!(ledger.active_alerts(DATE, "CIV", "app-update").unwrap().is_empty());
        let third = ledger
            .start_run(DATE, "CIV", "app-update", None, 1600)
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                third,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1700,
            )
            .unwrap();
        assert_eq!(stat.alerts.len(), 2);
    }

    #[test]
    fn error_rate_under_ten_percent_does_not_alert() {
        let (_, ledger) = fixture();
        let run = ledger
            .start_run(DATE, "CIV", "app-update", Some(120), 1000)
            .unwrap();
        ledger
            .add(
                DATE,
                "CIV",
                "app-update",
                run,
                &DailyDelta {
                    processed: 120,
                    successful: 112,
                    failed: 8,
                    ..DailyDelta::default()
                },
                1100,
            )
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                run,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1200,
            )
            .unwrap();
        assert!(stat.alerts.is_empty());
    }

    #[test]
    fn low_volume_days_do_not_alert() {
        let (_, ledger) = fixture();
        let run = ledger
            .start_run(DATE, "CIV", "app-update", Some(10), 1000)
            .unwrap();
        // 50% failure rate, but only 4 cases processed.
        ledger
            .add(
                DATE,
                "CIV",
                "app-update",
                run,
                &DailyDelta {
                    processed: 4,
                    successful: 2,
                    failed: 2,
                    ..DailyDelta::default()
                },
                1100,
            )
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "CIV",
                "app-update",
                run,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1200,
            )
            .unwrap();
        assert!(stat.alerts.is_empty());
    }

    #[test]
    fn captcha_failures_raise_their_own_alert() {
        let (_, ledger) = fixture();
        let run = ledger
            .start_run(DATE, "CSS", "app-update", Some(100), 1000)
            .unwrap();
        ledger
            .add(
                DATE,
                "CSS",
                "app-update",
                run,
                &DailyDelta {
                    processed: 20,
                    successful: 20,
                    captcha_attempts: 10,
                    captcha_successful: 6,
                    captcha_failed: 4,
                    ..DailyDelta::default()
                },
                1100,
            )
            .unwrap();
        let stat = ledger
            .finish_run(
                DATE,
                "CSS",
                "app-update",
                run,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                1200,
            )
            .unwrap();
        assert_eq!(stat.alerts.len(), 1);
        assert_eq!(stat.alerts[0].kind, AlertKind::CaptchaIssues);
    }

    #[test]
    fn error_log_is_a_bounded_fifo() {
        let (store, ledger) = fixture();
        for i in 0..(ERROR_LOG_CAP as u64 + 7) {
            ledger
                .log_error(
                    DATE,
                    "CIV",
                    "app-update",
                    Some(format!("CIV:2026:{i}")),
                    ErrorType::Timeout,
                    "page load timed out",
                    0,
                    1000 + i,
                )
                .unwrap();
        }
        let stat = store
            .get_daily(&daily_key(DATE, "CIV", "app-update"))
            .unwrap()
            .unwrap();
        assert_eq!(stat.errors.len(), ERROR_LOG_CAP);
        assert_eq!(stat.errors[0].timestamp, 1007);
        // Evicted entries stay counted.
        assert_eq!(stat.stats.failed, ERROR_LOG_CAP as u64 + 7);
    }
}
