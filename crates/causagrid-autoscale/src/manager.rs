//! The fleet-manager control loop.
//!
//! Each cycle samples worker counts and system resources through
//! callbacks, measures each fuero's eligible backlog through the
//! selector, runs the decision function, and persists the outcome: the
//! latest snapshot, a bounded history ring, alerts, and an hourly
//! manager-cycle row per fuero.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use causagrid_queue::EligibilitySelector;
use causagrid_state::period::now_epoch;
use causagrid_state::{
    ALERTS_CAP, Alert, AlertKind, Fuero, HISTORY_CAP, ManagerState, ResourceReadings, ScaleAction,
    ScalingConfig, ScalingConfigPatch, ScalingEvent, StateResult, StateSnapshot, StateStore,
    WorkerType, push_deduped,
};
use causagrid_stats::HourlyRecorder;

use crate::decision::{Decision, decide, within_working_hours};

/// Reports how many workers are currently running for a fuero.
pub type WorkerCountFn = Box<dyn Fn(&str) -> u32 + Send + Sync>;

/// Samples system resources; `None` when sampling is unavailable.
pub type ResourceSampleFn = Box<dyn Fn() -> Option<ResourceReadings> + Send + Sync>;

/// Backlog above this multiple of `scale_threshold` raises the
/// high-pending alert.
const HIGH_PENDING_FACTOR: u64 = 2;

pub struct AutoscalingManager {
    state: StateStore,
    selector: EligibilitySelector,
    recorder: HourlyRecorder,
    fueros: Vec<Fuero>,
    worker_type: WorkerType,
    worker_count_fn: WorkerCountFn,
    resource_fn: ResourceSampleFn,
}

impl AutoscalingManager {
    pub fn new(
        state: StateStore,
        selector: EligibilitySelector,
        fueros: Vec<Fuero>,
        worker_type: impl Into<WorkerType>,
    ) -> Self {
        let recorder = HourlyRecorder::new(state.clone());
        Self {
            state,
            selector,
            recorder,
            fueros,
            worker_type: worker_type.into(),
            worker_count_fn: Box::new(|_| 0),
            resource_fn: Box::new(|| None),
        }
    }

    /// Set the callback reporting running worker counts per fuero.
    pub fn with_worker_count_fn(mut self, f: WorkerCountFn) -> Self {
        self.worker_count_fn = f;
        self
    }

    /// Set the callback sampling system resources.
    pub fn with_resource_fn(mut self, f: ResourceSampleFn) -> Self {
        self.resource_fn = f;
        self
    }

    /// Run one control-loop cycle and return the per-fuero decisions.
    pub fn run_cycle(&self, now: u64) -> anyhow::Result<Vec<(Fuero, Decision)>> {
        let manager = self.state.get_or_create_manager(now)?;
        let config = manager.config;
        let within_hours = within_working_hours(now, &config);
        let resources = (self.resource_fn)();

        let mut workers: HashMap<Fuero, u32> = HashMap::new();
        let mut pending: HashMap<Fuero, u64> = HashMap::new();
        let mut optimal: HashMap<Fuero, u32> = HashMap::new();
        let mut decisions: Vec<(Fuero, Decision)> = Vec::new();

        for fuero in &self.fueros {
            let current = (self.worker_count_fn)(fuero);
            let backlog = self.selector.count_pending(fuero, now)?;
            let decision = decide(current, backlog, resources.as_ref(), within_hours, &config);
            if decision.action != ScaleAction::NoChange {
                info!(
                    %fuero,
                    from = decision.from,
                    to = decision.to,
                    reason = %decision.reason,
                    "scaling recommendation"
                );
            }
            workers.insert(fuero.clone(), current);
            pending.insert(fuero.clone(), backlog);
            optimal.insert(fuero.clone(), decision.to);
            decisions.push((fuero.clone(), decision));
        }

        let total_workers: u32 = workers.values().sum();
        let total_pending: u64 = pending.values().sum();

        let snapshot = StateSnapshot {
            timestamp: now,
            workers: workers.clone(),
            pending: pending.clone(),
            resources: resources.clone(),
        };

        self.state.update_manager(now, |m| {
            m.current.workers = workers.clone();
            m.current.pending = pending.clone();
            m.current.optimal_workers = optimal.clone();
            m.current.resources = resources.clone();
            m.current.is_running = true;
            m.current.is_within_working_hours = within_hours;
            m.current.last_cycle_at = Some(now);
            m.current.cycle_count += 1;
            m.history.push(snapshot.clone());
            if m.history.len() > HISTORY_CAP {
                let excess = m.history.len() - HISTORY_CAP;
                m.history.drain(..excess);
            }
            raise_alerts(m, &resources, total_workers, total_pending, now);
        })?;

        for (fuero, decision) in &decisions {
            let events: Vec<ScalingEvent> = if decision.action != ScaleAction::NoChange {
                vec![ScalingEvent {
                    timestamp: now,
                    action: decision.action,
                    from: decision.from,
                    to: decision.to,
                    reason: decision.reason.clone(),
                }]
            } else {
                Vec::new()
            };
            let fuero_workers = workers.get(fuero).copied().unwrap_or(0);
            let fuero_pending = pending.get(fuero).copied().unwrap_or(0);
            if let Err(e) = self.recorder.record_manager_cycle(
                fuero,
                &self.worker_type,
                fuero_workers,
                fuero_pending,
                &events,
                now,
            ) {
                warn!(%fuero, error = %e, "hourly manager-cycle record failed");
            }
        }

        debug!(
            cycle = manager.current.cycle_count + 1,
            total_workers, total_pending, within_hours, "cycle complete"
        );
        Ok(decisions)
    }

    /// Run the control loop until the shutdown signal flips.
    pub async fn run(
        &self,
        interval: Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        info!(
            interval_secs = interval.as_secs(),
            fueros = ?self.fueros,
            "fleet manager started"
        );
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = self.run_cycle(now_epoch()) {
                        error!(error = %e, "control cycle failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("fleet manager shutting down");
                    break;
                }
            }
        }
        if let Err(e) = self.mark_stopped(now_epoch()) {
            error!(error = %e, "failed to mark manager stopped");
        }
    }

    /// Record that the manager is no longer cycling. Leaves an alert so
    /// an unplanned death is visible the same way a clean exit is.
    pub fn mark_stopped(&self, now: u64) -> StateResult<ManagerState> {
        self.state.update_manager(now, |m| {
            m.current.is_running = false;
            push_deduped(
                &mut m.alerts,
                Alert::new(AlertKind::ManagerStopped, "fleet manager stopped", now),
                ALERTS_CAP,
            );
        })
    }

    /// Snapshots from the history ring no older than `hours_back`.
    pub fn history(&self, hours_back: u64, now: u64) -> StateResult<Vec<StateSnapshot>> {
        let cutoff = now.saturating_sub(hours_back * 3600);
        Ok(self
            .state
            .get_manager()?
            .map(|m| {
                m.history
                    .into_iter()
                    .filter(|s| s.timestamp >= cutoff)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Apply a partial configuration update; unset fields keep their
    /// stored values. Takes effect from the next cycle.
    pub fn update_config(
        &self,
        patch: &ScalingConfigPatch,
        now: u64,
    ) -> StateResult<ScalingConfig> {
        let state = self.state.update_manager(now, |m| {
            patch.apply(&mut m.config);
        })?;
        info!(
            max_workers = state.config.max_workers,
            scale_threshold = state.config.scale_threshold,
            "scaling config updated"
        );
        Ok(state.config)
    }

    /// Acknowledge manager alerts, optionally restricted to one kind.
    pub fn acknowledge_alerts(&self, kind: Option<AlertKind>, now: u64) -> StateResult<usize> {
        let mut changed = 0;
        self.state.update_manager(now, |m| {
            changed = causagrid_state::acknowledge(&mut m.alerts, kind);
        })?;
        Ok(changed)
    }
}

fn raise_alerts(
    m: &mut ManagerState,
    resources: &Option<ResourceReadings>,
    total_workers: u32,
    total_pending: u64,
    now: u64,
) {
    if let Some(readings) = resources {
        if readings.cpu_usage >= m.config.cpu_threshold {
            push_deduped(
                &mut m.alerts,
                Alert::new(
                    AlertKind::HighCpu,
                    format!("cpu at {:.0}%", readings.cpu_usage * 100.0),
                    now,
                ),
                ALERTS_CAP,
            );
        }
        if readings.memory_usage >= m.config.memory_threshold {
            push_deduped(
                &mut m.alerts,
                Alert::new(
                    AlertKind::HighMemory,
                    format!("memory at {:.0}%", readings.memory_usage * 100.0),
                    now,
                ),
                ALERTS_CAP,
            );
        }
    }
    if total_workers == 0 && total_pending > 0 {
        push_deduped(
            &mut m.alerts,
            Alert::new(
                AlertKind::NoWorkers,
                format!("{total_pending} cases pending with no workers running"),
                now,
            ),
            ALERTS_CAP,
        );
    }
    if total_pending > m.config.scale_threshold * HIGH_PENDING_FACTOR {
        push_deduped(
            &mut m.alerts,
            Alert::new(
                AlertKind::HighPending,
                format!("backlog at {total_pending} cases"),
                now,
            ),
            ALERTS_CAP,
        );
    }
}
