//! Daily summary generation — condenses one day's hourly buckets,
//! daily ledgers, and per-case counters into a single cross-fuero
//! record.
//!
//! The summary is derived state. Generating it is idempotent: it reads
//! whatever the lower tiers hold at that moment and replaces the
//! stored summary wholesale, so a regeneration after late reports
//! simply produces a more complete record.

use std::collections::HashMap;

use tracing::info;

use causagrid_state::period::{business_date, previous_date};
use causagrid_state::{
    DailyStat, DailySummary, DayComparison, DayStatus, ErrorType, FueroBreakdown, HourSlot,
    HourlyStat, StateResult, StateStore, SummaryTotals, TopCausa, TopError, Trend,
};

/// How many cases and error types the summary ranks.
const TOP_CAUSAS: usize = 10;
const TOP_ERRORS: usize = 5;

#[derive(Clone)]
pub struct SummaryBuilder {
    state: StateStore,
}

impl SummaryBuilder {
    pub fn new(state: StateStore) -> Self {
        Self { state }
    }

    /// Build and store the summary for (date, worker type).
    pub fn generate(
        &self,
        date: &str,
        worker_type: &str,
        now: u64,
    ) -> StateResult<DailySummary> {
        let hourly = self.state.list_hourly_for_date(date, Some(worker_type))?;
        let daily = self.state.list_daily_for_date(date, Some(worker_type))?;

        let totals = build_totals(&daily, &hourly);
        let by_fuero = build_fuero_breakdown(&daily, &hourly);
        let hourly_distribution = build_hour_slots(&hourly);
        let top_causas = self.rank_causas(date, &daily)?;
        let top_errors = rank_errors(&daily);
        let status = derive_status(date, &daily, &totals, now);
        let alerts_count = daily.iter().map(|d| d.alerts.len() as u32).sum();
        let has_unacknowledged_alerts = daily
            .iter()
            .any(|d| d.alerts.iter().any(|a| !a.acknowledged));
        let comparison = self.compare_with_previous(date, worker_type, &totals)?;

        let summary = DailySummary {
            date: date.to_string(),
            worker_type: worker_type.to_string(),
            totals,
            by_fuero,
            hourly_distribution,
            top_causas,
            top_errors,
            status,
            alerts_count,
            has_unacknowledged_alerts,
            comparison,
            generated_at: now,
        };
        self.state.put_summary(&summary)?;
        info!(%date, %worker_type, processed = summary.totals.processed, "daily summary generated");
        Ok(summary)
    }

    /// Rank the day's most-updated cases across the fueros that saw
    /// activity, using the per-case daily counters.
    fn rank_causas(&self, date: &str, daily: &[DailyStat]) -> StateResult<Vec<TopCausa>> {
        let mut ranked: Vec<TopCausa> = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for stat in daily {
            if seen.contains(&stat.fuero.as_str()) {
                continue;
            }
            seen.push(&stat.fuero);
            for item in self.state.list_cases(&stat.fuero)? {
                if item.daily_updates.date == date && item.daily_updates.count > 0 {
                    ranked.push(TopCausa {
                        case_key: item.table_key(),
                        fuero: item.fuero.clone(),
                        update_count: item.daily_updates.count,
                        movimientos_total: item.movimientos_count,
                    });
                }
            }
        }
        ranked.sort_by(|a, b| b.update_count.cmp(&a.update_count));
        ranked.truncate(TOP_CAUSAS);
        Ok(ranked)
    }

    fn compare_with_previous(
        &self,
        date: &str,
        worker_type: &str,
        totals: &SummaryTotals,
    ) -> StateResult<Option<DayComparison>> {
        let prev_date = previous_date(date);
        let Some(prev) = self.state.get_summary(&prev_date, worker_type)? else {
            return Ok(None);
        };
        let processed_change_pct = pct_change(prev.totals.processed, totals.processed);
        let movimientos_change_pct =
            pct_change(prev.totals.movimientos_found, totals.movimientos_found);
        let success_rate_change = totals.success_rate as i64 - prev.totals.success_rate as i64;
        let trend = if totals.processed > prev.totals.processed {
            Trend::Up
        } else if totals.processed < prev.totals.processed {
            Trend::Down
        } else {
            Trend::Stable
        };
        Ok(Some(DayComparison {
            processed_change_pct,
            movimientos_change_pct,
            success_rate_change,
            trend,
        }))
    }
}

/// Percent change day over day. A day with no baseline reports 0; the
/// comparison only becomes meaningful once both days saw activity.
fn pct_change(previous: u64, current: u64) -> i64 {
    if previous == 0 {
        return 0;
    }
    ((current as f64 - previous as f64) / previous as f64 * 100.0).round() as i64
}

fn rate_pct(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

fn build_totals(daily: &[DailyStat], hourly: &[HourlyStat]) -> SummaryTotals {
    let processed: u64 = daily.iter().map(|d| d.stats.processed).sum();
    let successful: u64 = daily.iter().map(|d| d.stats.successful).sum();
    let failed: u64 = daily.iter().map(|d| d.stats.failed).sum();
    let movimientos_found: u64 = daily.iter().map(|d| d.stats.movimientos_found).sum();
    let total_time: u64 = daily.iter().map(|d| d.stats.total_processing_time_ms).sum();

    let mut active_hours: Vec<u8> = hourly
        .iter()
        .filter(|h| h.stats.processed > 0)
        .map(|h| h.hour)
        .collect();
    active_hours.sort_unstable();
    active_hours.dedup();

    SummaryTotals {
        processed,
        successful,
        failed,
        movimientos_found,
        avg_processing_time_ms: if processed > 0 { total_time / processed } else { 0 },
        success_rate: rate_pct(successful, processed),
        total_working_hours: active_hours.len() as u32,
        first_activity_hour: active_hours.first().copied(),
        last_activity_hour: active_hours.last().copied(),
    }
}

fn build_fuero_breakdown(daily: &[DailyStat], hourly: &[HourlyStat]) -> Vec<FueroBreakdown> {
    let mut breakdown: Vec<FueroBreakdown> = daily
        .iter()
        .map(|stat| {
            let counters = &stat.stats;
            let fuero_hours: Vec<&HourlyStat> =
                hourly.iter().filter(|h| h.fuero == stat.fuero).collect();
            let mut active_hours: Vec<u8> = fuero_hours
                .iter()
                .filter(|h| h.stats.processed > 0)
                .map(|h| h.hour)
                .collect();
            active_hours.sort_unstable();
            active_hours.dedup();
            let peak = fuero_hours
                .iter()
                .filter(|h| h.stats.processed > 0)
                .max_by_key(|h| h.stats.processed);
            FueroBreakdown {
                fuero: stat.fuero.clone(),
                processed: counters.processed,
                successful: counters.successful,
                failed: counters.failed,
                movimientos_found: counters.movimientos_found,
                avg_processing_time_ms: if counters.processed > 0 {
                    counters.total_processing_time_ms / counters.processed
                } else {
                    0
                },
                success_rate: rate_pct(counters.successful, counters.processed),
                active_hours,
                peak_hour: peak.map(|h| h.hour),
                peak_hour_processed: peak.map(|h| h.stats.processed).unwrap_or(0),
                max_workers: fuero_hours
                    .iter()
                    .map(|h| h.stats.max_active_workers)
                    .max()
                    .unwrap_or(0),
            }
        })
        .collect();
    breakdown.sort_by(|a, b| b.processed.cmp(&a.processed));
    breakdown
}

fn build_hour_slots(hourly: &[HourlyStat]) -> Vec<HourSlot> {
    (0u8..24)
        .map(|hour| {
            let rows: Vec<&HourlyStat> = hourly.iter().filter(|h| h.hour == hour).collect();
            // Fueros run concurrently, so the hour's worker level is the
            // busiest bucket, not an average of the buckets.
            let avg_workers = rows
                .iter()
                .map(|h| h.stats.avg_active_workers)
                .fold(0.0, f64::max);
            HourSlot {
                hour,
                processed: rows.iter().map(|h| h.stats.processed).sum(),
                successful: rows.iter().map(|h| h.stats.successful).sum(),
                failed: rows.iter().map(|h| h.stats.failed).sum(),
                movimientos_found: rows.iter().map(|h| h.stats.movimientos_found).sum(),
                avg_workers,
            }
        })
        .collect()
}

fn rank_errors(daily: &[DailyStat]) -> Vec<TopError> {
    let mut counts: HashMap<ErrorType, (u64, String)> = HashMap::new();
    let mut total: u64 = 0;
    for stat in daily {
        for entry in &stat.errors {
            total += 1;
            let slot = counts
                .entry(entry.error_type)
                .or_insert_with(|| (0, entry.message.clone()));
            slot.0 += 1;
        }
    }
    let mut ranked: Vec<TopError> = counts
        .into_iter()
        .map(|(error_type, (count, example_message))| TopError {
            error_type,
            count,
            percentage: rate_pct(count, total),
            example_message,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_ERRORS);
    ranked
}

fn derive_status(date: &str, daily: &[DailyStat], totals: &SummaryTotals, now: u64) -> DayStatus {
    if daily.is_empty() || totals.processed == 0 {
        return DayStatus::Pending;
    }
    // A summary generated during the day it covers is a progress view,
    // even between runs when every run so far has closed.
    if totals.total_working_hours > 0 && business_date(now) == date {
        return DayStatus::InProgress;
    }
    let fail_ratio = totals.failed as f64 / totals.processed as f64;
    if fail_ratio > 0.5 {
        DayStatus::Failed
    } else if fail_ratio > 0.1 {
        DayStatus::Partial
    } else {
        DayStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::{DailyDelta, DailyLedger, RunReport};
    use crate::hourly::{HourlyRecorder, Outcome, OutcomeReport};
    use causagrid_state::{RunStatus, WorkItem};

    // 2026-03-15 12:00:00 UTC → 09:00 business time.
    const MIDDAY: u64 = 1773576000;
    const DATE: &str = "2026-03-15";
    const WT: &str = "app-update";

    fn seed_day(store: &StateStore) {
        let ledger = DailyLedger::new(store.clone());
        let recorder = HourlyRecorder::new(store.clone());

        for (fuero, processed, successful, failed, movs) in
            [("CIV", 60, 57, 3, 120), ("COM", 30, 30, 0, 45)]
        {
            let run = ledger.start_run(DATE, fuero, WT, Some(processed), 1000).unwrap();
            ledger
                .add(
                    DATE,
                    fuero,
                    WT,
                    run,
                    &DailyDelta {
                        processed,
                        successful,
                        failed,
                        movimientos_found: movs,
                        processing_time_ms: processed * 1500,
                        ..DailyDelta::default()
                    },
                    1100,
                )
                .unwrap();
            ledger
                .finish_run(
                    DATE,
                    fuero,
                    WT,
                    run,
                    RunStatus::Completed,
                    None,
                    &RunReport::default(),
                    1200,
                )
                .unwrap();
        }

        // Activity at 09:00 and 11:00 business time.
        for (epoch, fuero, count) in [(MIDDAY, "CIV", 4), (MIDDAY + 2 * 3600, "CIV", 2), (MIDDAY, "COM", 3)] {
            for _ in 0..count {
                recorder
                    .record(
                        &OutcomeReport {
                            fuero: fuero.to_string(),
                            worker_type: WT.to_string(),
                            outcome: Outcome::Success,
                            movimientos_found: 1,
                            processing_time_ms: Some(1000),
                        },
                        epoch,
                    )
                    .unwrap();
            }
        }
        recorder
            .record_manager_cycle("CIV", WT, 3, 200, &[], MIDDAY)
            .unwrap();
    }

    #[test]
    fn summary_aggregates_both_lower_tiers() {
        let store = StateStore::open_in_memory().unwrap();
        seed_day(&store);

        // A case updated today feeds the top-causas ranking.
        let mut item = WorkItem::new("CIV", 2026, 42, "scraping", 0);
        item.movimientos_count = 17;
        item.daily_updates.date = DATE.to_string();
        item.daily_updates.count = 5;
        store.put_case(&item).unwrap();

        let builder = SummaryBuilder::new(store);
        // Generated the day after, so the day is closed.
        let summary = builder.generate(DATE, WT, MIDDAY + 24 * 3600).unwrap();

        assert_eq!(summary.totals.processed, 90);
        assert_eq!(summary.totals.successful, 87);
        assert_eq!(summary.totals.success_rate, 97);
        assert_eq!(summary.totals.avg_processing_time_ms, 1500);
        assert_eq!(summary.totals.total_working_hours, 2);
        assert_eq!(summary.totals.first_activity_hour, Some(9));
        assert_eq!(summary.totals.last_activity_hour, Some(11));
        assert_eq!(summary.status, DayStatus::Completed);

        // CIV processed more, so it leads the breakdown.
        assert_eq!(summary.by_fuero.len(), 2);
        assert_eq!(summary.by_fuero[0].fuero, "CIV");
        assert_eq!(summary.by_fuero[0].peak_hour, Some(9));
        assert_eq!(summary.by_fuero[0].peak_hour_processed, 4);
        assert_eq!(summary.by_fuero[0].max_workers, 3);

        assert_eq!(summary.hourly_distribution.len(), 24);
        assert_eq!(summary.hourly_distribution[9].processed, 7);
        assert_eq!(summary.hourly_distribution[11].processed, 2);
        assert_eq!(summary.hourly_distribution[0].processed, 0);
        // The busiest fuero sets the hour's worker level; COM's empty
        // bucket does not drag CIV's 3 workers down.
        assert_eq!(summary.hourly_distribution[9].avg_workers, 3.0);

        assert_eq!(summary.top_causas.len(), 1);
        assert_eq!(summary.top_causas[0].case_key, "CIV:2026:42");
        assert_eq!(summary.top_causas[0].update_count, 5);

        assert!(summary.comparison.is_none());
    }

    #[test]
    fn regeneration_is_idempotent() {
        let store = StateStore::open_in_memory().unwrap();
        seed_day(&store);
        let builder = SummaryBuilder::new(store.clone());

        let first = builder.generate(DATE, WT, MIDDAY + 24 * 3600).unwrap();
        let second = builder.generate(DATE, WT, MIDDAY + 25 * 3600).unwrap();

        assert_eq!(first.totals, second.totals);
        assert_eq!(first.by_fuero, second.by_fuero);
        assert_eq!(store.get_summary(DATE, WT).unwrap().unwrap(), second);
    }

    #[test]
    fn comparison_against_previous_day() {
        let store = StateStore::open_in_memory().unwrap();
        seed_day(&store);
        let builder = SummaryBuilder::new(store.clone());

        // Previous day: 45 processed, 80% success.
        let ledger = DailyLedger::new(store.clone());
        let prev_date = "2026-03-14";
        let run = ledger.start_run(prev_date, "CIV", WT, Some(45), 500).unwrap();
        ledger
            .add(
                prev_date,
                "CIV",
                WT,
                run,
                &DailyDelta {
                    processed: 45,
                    successful: 36,
                    failed: 9,
                    ..DailyDelta::default()
                },
                600,
            )
            .unwrap();
        ledger
            .finish_run(
                prev_date,
                "CIV",
                WT,
                run,
                RunStatus::Completed,
                None,
                &RunReport::default(),
                700,
            )
            .unwrap();
        builder.generate(prev_date, WT, MIDDAY).unwrap();

        let summary = builder.generate(DATE, WT, MIDDAY + 24 * 3600).unwrap();
        let comparison = summary.comparison.unwrap();
        // 45 → 90 processed.
        assert_eq!(comparison.processed_change_pct, 100);
        assert_eq!(comparison.success_rate_change, 97 - 80);
        assert_eq!(comparison.trend, Trend::Up);
        // The previous day found no movimientos, so there is no
        // baseline to compare against.
        assert_eq!(comparison.movimientos_change_pct, 0);
    }

    #[test]
    fn any_processed_change_moves_the_trend() {
        let store = StateStore::open_in_memory().unwrap();
        let ledger = DailyLedger::new(store.clone());
        let builder = SummaryBuilder::new(store);

        for (date, processed) in [("2026-03-13", 100u64), ("2026-03-14", 102)] {
            let run = ledger.start_run(date, "CIV", WT, Some(processed), 500).unwrap();
            ledger
                .add(
                    date,
                    "CIV",
                    WT,
                    run,
                    &DailyDelta {
                        processed,
                        successful: processed,
                        ..DailyDelta::default()
                    },
                    600,
                )
                .unwrap();
            ledger
                .finish_run(
                    date,
                    "CIV",
                    WT,
                    run,
                    RunStatus::Completed,
                    None,
                    &RunReport::default(),
                    700,
                )
                .unwrap();
            builder.generate(date, WT, MIDDAY + 24 * 3600).unwrap();
        }

        // 100 → 102 is a 2% rise and already counts as upward.
        let summary = builder.generate("2026-03-14", WT, MIDDAY + 24 * 3600).unwrap();
        let comparison = summary.comparison.unwrap();
        assert_eq!(comparison.processed_change_pct, 2);
        assert_eq!(comparison.trend, Trend::Up);
    }

    #[test]
    fn same_day_summary_stays_in_progress_between_runs() {
        let store = StateStore::open_in_memory().unwrap();
        seed_day(&store);
        let builder = SummaryBuilder::new(store);

        // Every run has closed, but the business day it covers has not:
        // the summary is still a progress view, not a final verdict.
        let summary = builder.generate(DATE, WT, MIDDAY + 3600).unwrap();
        assert_eq!(summary.status, DayStatus::InProgress);
    }

    #[test]
    fn empty_day_summarizes_as_pending() {
        let store = StateStore::open_in_memory().unwrap();
        let builder = SummaryBuilder::new(store);
        let summary = builder.generate("2026-03-20", WT, MIDDAY).unwrap();
        assert_eq!(summary.status, DayStatus::Pending);
        assert_eq!(summary.totals.processed, 0);
        assert!(summary.by_fuero.is_empty());
        assert_eq!(summary.hourly_distribution.len(), 24);
    }

    #[test]
    fn error_ranking_carries_percentages() {
        let store = StateStore::open_in_memory().unwrap();
        seed_day(&store);
        let ledger = DailyLedger::new(store.clone());
        for _ in 0..3 {
            ledger
                .log_error(DATE, "CIV", WT, None, ErrorType::Timeout, "slow page", 0, 1000)
                .unwrap();
        }
        ledger
            .log_error(DATE, "CIV", WT, None, ErrorType::CaptchaFailed, "no token", 1, 1000)
            .unwrap();

        let builder = SummaryBuilder::new(store);
        let summary = builder.generate(DATE, WT, MIDDAY + 24 * 3600).unwrap();
        assert_eq!(summary.top_errors.len(), 2);
        assert_eq!(summary.top_errors[0].error_type, ErrorType::Timeout);
        assert_eq!(summary.top_errors[0].count, 3);
        assert_eq!(summary.top_errors[0].percentage, 75);
        assert_eq!(summary.top_errors[0].example_message, "slow page");
    }
}
