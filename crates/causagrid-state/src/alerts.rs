//! Shared alert model.
//!
//! Both the daily statistics ledger and the fleet manager carry alert
//! lists with the same semantics: an alert of a given kind is appended
//! only while no unacknowledged alert of that kind exists, the list is
//! capped with oldest-first eviction, and alerts persist until an
//! operator acknowledges them — they never auto-expire.

use serde::{Deserialize, Serialize};

use crate::types::Fuero;

/// Kinds of alerts raised by the statistics ledger and the fleet manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    // Daily-statistics alerts.
    HighErrorRate,
    NoUpdates,
    SlowProcessing,
    CaptchaIssues,
    // Fleet-manager alerts.
    HighCpu,
    HighMemory,
    NoWorkers,
    HighPending,
    ManagerStopped,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighErrorRate => "high_error_rate",
            Self::NoUpdates => "no_updates",
            Self::SlowProcessing => "slow_processing",
            Self::CaptchaIssues => "captcha_issues",
            Self::HighCpu => "high_cpu",
            Self::HighMemory => "high_memory",
            Self::NoWorkers => "no_workers",
            Self::HighPending => "high_pending",
            Self::ManagerStopped => "manager_stopped",
        }
    }
}

/// A persisted alert. Lives until explicitly acknowledged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    /// Fuero the alert pertains to, when scoped to one.
    pub fuero: Option<Fuero>,
    pub created_at: u64,
    pub acknowledged: bool,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>, now: u64) -> Self {
        Self {
            kind,
            message: message.into(),
            fuero: None,
            created_at: now,
            acknowledged: false,
        }
    }

    pub fn for_fuero(mut self, fuero: impl Into<Fuero>) -> Self {
        self.fuero = Some(fuero.into());
        self
    }
}

/// Append `alert` unless an unacknowledged alert of the same kind is
/// already present, trimming the list to `cap` (oldest evicted).
///
/// Returns whether the alert was stored.
pub fn push_deduped(alerts: &mut Vec<Alert>, alert: Alert, cap: usize) -> bool {
    let duplicate = alerts
        .iter()
        .any(|a| a.kind == alert.kind && !a.acknowledged);
    if duplicate {
        return false;
    }
    alerts.push(alert);
    if alerts.len() > cap {
        let excess = alerts.len() - cap;
        alerts.drain(..excess);
    }
    true
}

/// Acknowledge alerts in place, optionally restricted to one kind.
///
/// Returns how many alerts changed state.
pub fn acknowledge(alerts: &mut [Alert], kind: Option<AlertKind>) -> usize {
    let mut changed = 0;
    for alert in alerts.iter_mut() {
        if alert.acknowledged {
            continue;
        }
        if kind.is_none_or(|k| k == alert.kind) {
            alert.acknowledged = true;
            changed += 1;
        }
    }
    changed
}
