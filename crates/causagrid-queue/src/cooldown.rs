//! Error cooldown — per-case failure counter and backoff window.
//!
//! A case that fails `max_consecutive_errors` times in a row gets a
//! `skip_until` stamp `cooldown_hours` in the future. The selector
//! excludes parked cases from candidate pages until the window
//! elapses; nothing ever blocks on it, and a single success resets
//! the counter.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use causagrid_state::{ErrorType, StateResult, StateStore};

/// Cooldown thresholds. Persisted alongside worker configuration and
/// passed in explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CooldownConfig {
    /// Consecutive failures before a case is parked.
    pub max_consecutive_errors: u32,
    /// Length of the park window.
    pub cooldown_hours: u64,
    /// When disabled, failures are still counted but never park.
    pub enabled: bool,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            max_consecutive_errors: 3,
            cooldown_hours: 6,
            enabled: true,
        }
    }
}

/// What a reported failure did to the case's cooldown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownOutcome {
    /// Failure counted; the case remains selectable.
    Counted(u32),
    /// The threshold was reached; the case is parked until the instant.
    Parked { skip_until: u64 },
}

/// Store-backed cooldown state machine.
#[derive(Clone)]
pub struct CooldownController {
    state: StateStore,
    config: CooldownConfig,
}

impl CooldownController {
    pub fn new(state: StateStore, config: CooldownConfig) -> Self {
        Self { state, config }
    }

    pub fn config(&self) -> &CooldownConfig {
        &self.config
    }

    /// A successful refresh resets the consecutive-error counter and
    /// lifts any park window.
    pub fn on_success(&self, key: &str) -> StateResult<()> {
        self.state.update_case(key, |item| {
            if item.cooldown.consecutive_errors == 0 && item.cooldown.skip_until.is_none() {
                return false;
            }
            item.cooldown.consecutive_errors = 0;
            item.cooldown.skip_until = None;
            true
        })?;
        Ok(())
    }

    /// Count a failure against the case, parking it once the
    /// configured threshold is reached.
    pub fn on_failure(
        &self,
        key: &str,
        error_type: ErrorType,
        now: u64,
    ) -> StateResult<CooldownOutcome> {
        let mut outcome = CooldownOutcome::Counted(0);
        let config = self.config.clone();
        self.state.update_case(key, |item| {
            item.cooldown.consecutive_errors += 1;
            item.cooldown.last_error_type = Some(error_type);
            item.cooldown.last_error_at = Some(now);
            let errors = item.cooldown.consecutive_errors;
            if config.enabled && errors >= config.max_consecutive_errors {
                let skip_until = now + config.cooldown_hours * 3600;
                item.cooldown.skip_until = Some(skip_until);
                outcome = CooldownOutcome::Parked { skip_until };
            } else {
                outcome = CooldownOutcome::Counted(errors);
            }
            true
        })?;
        if let CooldownOutcome::Parked { skip_until } = outcome {
            info!(
                %key,
                error_type = error_type.as_str(),
                skip_until,
                "case parked after repeated failures"
            );
        } else {
            debug!(%key, error_type = error_type.as_str(), "failure counted");
        }
        Ok(outcome)
    }
}
