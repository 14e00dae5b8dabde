//! Eligibility selection — filter, oldest-first ordering, backlog size.

use serde::{Deserialize, Serialize};
use tracing::debug;

use causagrid_state::{StateResult, StateStore, WorkItem};

/// Which cases a worker is allowed to pick up, and how stale a case
/// must be before it is due again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectorConfig {
    /// Cases whose `source` is not listed here are never selected.
    pub allowed_sources: Vec<String>,
    /// A case is due when its last refresh is at least this old.
    pub update_threshold_hours: u64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            allowed_sources: vec![
                "scraping".to_string(),
                "scraping-capsolver".to_string(),
                "app".to_string(),
            ],
            update_threshold_hours: 12,
        }
    }
}

/// Store-backed candidate picker for one jurisdiction at a time.
#[derive(Clone)]
pub struct EligibilitySelector {
    state: StateStore,
    config: SelectorConfig,
}

impl EligibilitySelector {
    pub fn new(state: StateStore, config: SelectorConfig) -> Self {
        Self { state, config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    fn is_eligible(&self, item: &WorkItem, now: u64) -> bool {
        if !self.config.allowed_sources.iter().any(|s| s == &item.source) {
            return false;
        }
        if !item.verified || !item.is_valid || !item.needs_update {
            return false;
        }
        let threshold = self.config.update_threshold_hours * 3600;
        if now.saturating_sub(item.last_update) < threshold {
            return false;
        }
        if item.has_live_lease(now) {
            return false;
        }
        if item.cooldown.is_parked(now) {
            return false;
        }
        true
    }

    /// The next page of due cases for a jurisdiction, stalest first.
    pub fn next_batch(
        &self,
        fuero: &str,
        limit: usize,
        now: u64,
    ) -> StateResult<Vec<WorkItem>> {
        let mut candidates: Vec<WorkItem> = self
            .state
            .list_cases(fuero)?
            .into_iter()
            .filter(|item| self.is_eligible(item, now))
            .collect();
        candidates.sort_by_key(|item| item.last_update);
        candidates.truncate(limit);
        debug!(%fuero, picked = candidates.len(), "selected candidate batch");
        Ok(candidates)
    }

    /// How many cases in a jurisdiction are due right now. Drives the
    /// scaling decision, so it applies the same filter as selection.
    pub fn count_pending(&self, fuero: &str, now: u64) -> StateResult<u64> {
        let count = self
            .state
            .list_cases(fuero)?
            .iter()
            .filter(|item| self.is_eligible(item, now))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causagrid_state::Lease;

    const HOUR: u64 = 3600;

    fn store_with(items: &[WorkItem]) -> StateStore {
        let store = StateStore::open_in_memory().unwrap();
        for item in items {
            store.put_case(item).unwrap();
        }
        store
    }

    fn due_item(number: u32, last_update: u64) -> WorkItem {
        let mut item = WorkItem::new("CIV", 2026, number, "scraping", 1000);
        item.verified = true;
        item.is_valid = true;
        item.needs_update = true;
        item.last_update = last_update;
        item
    }

    #[test]
    fn stalest_cases_come_first() {
        let now = 100 * HOUR;
        let old = due_item(2, 10 * HOUR);
        let oldest = due_item(1, 0);
        let older = due_item(3, 5 * HOUR);
        let store = store_with(&[old, oldest, older]);

        let selector = EligibilitySelector::new(store, SelectorConfig::default());
        let batch = selector.next_batch("CIV", 10, now).unwrap();
        let numbers: Vec<u32> = batch.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 3, 2]);
    }

    #[test]
    fn limit_truncates_after_ordering() {
        let now = 100 * HOUR;
        let items: Vec<WorkItem> = (1..=5).map(|n| due_item(n, n as u64 * HOUR)).collect();
        let store = store_with(&items);
        let selector = EligibilitySelector::new(store, SelectorConfig::default());

        let batch = selector.next_batch("CIV", 2, now).unwrap();
        let numbers: Vec<u32> = batch.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn fresh_cases_are_not_due() {
        let now = 100 * HOUR;
        let fresh = due_item(1, now - 2 * HOUR);
        let store = store_with(&[fresh]);
        let selector = EligibilitySelector::new(store, SelectorConfig::default());
        assert!(selector.next_batch("CIV", 10, now).unwrap().is_empty());
        assert_eq!(selector.count_pending("CIV", now).unwrap(), 0);
    }

    #[test]
    fn parked_cases_are_skipped_until_window_elapses() {
        let now = 100 * HOUR;
        let mut parked = due_item(1, 10 * HOUR);
        parked.cooldown.consecutive_errors = 3;
        parked.cooldown.skip_until = Some(now + HOUR);
        let store = store_with(&[parked]);
        let selector = EligibilitySelector::new(store, SelectorConfig::default());

        assert!(selector.next_batch("CIV", 10, now).unwrap().is_empty());
        // The window is inclusive of its end: eligible again at skip_until.
        let after = now + HOUR;
        assert_eq!(selector.next_batch("CIV", 10, after).unwrap().len(), 1);
    }

    #[test]
    fn live_lease_excludes_but_expired_lease_does_not() {
        let now = 100 * HOUR;
        let mut leased = due_item(1, 10 * HOUR);
        leased.lease = Some(Lease {
            worker_id: "w-1".to_string(),
            locked_at: now - 60,
            expires_at: now + 60,
        });
        let mut expired = due_item(2, 10 * HOUR);
        expired.lease = Some(Lease {
            worker_id: "w-2".to_string(),
            locked_at: now - 600,
            expires_at: now - 60,
        });
        let store = store_with(&[leased, expired]);
        let selector = EligibilitySelector::new(store, SelectorConfig::default());

        let batch = selector.next_batch("CIV", 10, now).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].number, 2);
    }

    #[test]
    fn filter_gates_source_and_flags() {
        let now = 100 * HOUR;
        let mut wrong_source = due_item(1, 10 * HOUR);
        wrong_source.source = "manual".to_string();
        let mut unverified = due_item(2, 10 * HOUR);
        unverified.verified = false;
        let mut invalid = due_item(3, 10 * HOUR);
        invalid.is_valid = false;
        let mut settled = due_item(4, 10 * HOUR);
        settled.needs_update = false;
        let fine = due_item(5, 10 * HOUR);
        let store = store_with(&[wrong_source, unverified, invalid, settled, fine]);
        let selector = EligibilitySelector::new(store, SelectorConfig::default());

        let batch = selector.next_batch("CIV", 10, now).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].number, 5);
        assert_eq!(selector.count_pending("CIV", now).unwrap(), 1);
    }
}
