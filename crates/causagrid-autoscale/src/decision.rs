//! The scaling decision — a pure function of backlog, worker count,
//! resource readings, and configuration.

use causagrid_state::period::{business_hour, business_weekday};
use causagrid_state::{ResourceReadings, ScaleAction, ScalingConfig};

/// A scaling recommendation for one fuero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: ScaleAction,
    pub from: u32,
    pub to: u32,
    pub reason: String,
}

impl Decision {
    fn hold(current: u32, reason: impl Into<String>) -> Self {
        Self {
            action: ScaleAction::NoChange,
            from: current,
            to: current,
            reason: reason.into(),
        }
    }
}

/// Whether `now` falls inside the configured working window, in the
/// business timezone.
pub fn within_working_hours(now: u64, config: &ScalingConfig) -> bool {
    let weekday = business_weekday(now);
    if !config.work_days.contains(&weekday) {
        return false;
    }
    let hour = business_hour(now);
    hour >= config.work_start_hour && hour < config.work_end_hour
}

/// Decide the next worker count for one fuero.
///
/// Scales up by one worker when the backlog exceeds `scale_threshold`,
/// but only inside working hours and while cpu/memory sit below their
/// thresholds — absent readings do not block a scale-up. Scales down
/// by one when the backlog drops under `scale_down_threshold`. The
/// result is always clamped to `[min_workers, max_workers]`.
pub fn decide(
    current: u32,
    pending: u64,
    resources: Option<&ResourceReadings>,
    within_hours: bool,
    config: &ScalingConfig,
) -> Decision {
    if pending > config.scale_threshold {
        if !within_hours {
            return Decision::hold(current, "outside working hours");
        }
        if let Some(readings) = resources {
            if readings.cpu_usage >= config.cpu_threshold {
                return Decision::hold(
                    current,
                    format!("cpu at {:.0}%", readings.cpu_usage * 100.0),
                );
            }
            if readings.memory_usage >= config.memory_threshold {
                return Decision::hold(
                    current,
                    format!("memory at {:.0}%", readings.memory_usage * 100.0),
                );
            }
        }
        if current >= config.max_workers {
            return Decision::hold(current, "at max_workers");
        }
        let to = (current + 1).min(config.max_workers);
        return Decision {
            action: ScaleAction::ScaleUp,
            from: current,
            to,
            reason: format!("backlog {pending} above {}", config.scale_threshold),
        };
    }

    if pending < config.scale_down_threshold {
        if current <= config.min_workers {
            return Decision::hold(current, "at min_workers");
        }
        let to = (current - 1).max(config.min_workers);
        return Decision {
            action: ScaleAction::ScaleDown,
            from: current,
            to,
            reason: format!("backlog {pending} below {}", config.scale_down_threshold),
        };
    }

    Decision::hold(current, "backlog within thresholds")
}
