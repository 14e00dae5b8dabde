//! Lease locking — atomic claim/renew/release of a case for one worker.
//!
//! A lease is a `{worker_id, locked_at, expires_at}` value embedded in
//! the case record. Acquisition is a single test-then-set inside one
//! store write transaction: two concurrent acquirers on the same case
//! never both succeed. An expired lease is treated as absent and is
//! silently reclaimable by any worker regardless of the stored owner.

use tracing::debug;

use causagrid_state::{Lease, StateResult, StateStore};

/// Result of a lease acquisition attempt. "Not acquired" is an
/// ordinary outcome, not a fault — callers move to the next candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseOutcome {
    /// No lease existed; the claim is ours.
    Acquired,
    /// An expired lease was taken over (informational only).
    Reclaimed,
    /// A live lease is held elsewhere, or the case does not exist.
    Contended,
}

impl LeaseOutcome {
    pub fn is_acquired(&self) -> bool {
        !matches!(self, Self::Contended)
    }
}

/// Store-backed lease operations.
#[derive(Clone)]
pub struct LeaseManager {
    state: StateStore,
}

impl LeaseManager {
    pub fn new(state: StateStore) -> Self {
        Self { state }
    }

    /// Attempt to claim the case for `worker_id` until `now + ttl_secs`.
    ///
    /// Succeeds only if no lease exists, the existing lease has
    /// expired, or the caller already owns the live lease — in which
    /// case the acquire just extends it.
    pub fn acquire(
        &self,
        key: &str,
        worker_id: &str,
        ttl_secs: u64,
        now: u64,
    ) -> StateResult<LeaseOutcome> {
        let mut outcome = LeaseOutcome::Contended;
        self.state.update_case(key, |item| {
            match &mut item.lease {
                Some(lease) if !lease.is_expired(now) => {
                    if lease.worker_id != worker_id {
                        return false;
                    }
                    lease.expires_at = now + ttl_secs;
                    outcome = LeaseOutcome::Acquired;
                    true
                }
                existing => {
                    outcome = match existing {
                        None => LeaseOutcome::Acquired,
                        Some(_) => LeaseOutcome::Reclaimed,
                    };
                    item.lease = Some(Lease {
                        worker_id: worker_id.to_string(),
                        locked_at: now,
                        expires_at: now + ttl_secs,
                    });
                    true
                }
            }
        })?;
        if outcome == LeaseOutcome::Reclaimed {
            debug!(%key, %worker_id, "expired lease reclaimed");
        }
        Ok(outcome)
    }

    /// Release the lease, but only if `worker_id` still owns it.
    /// Returns whether a lease was cleared; anything else is a no-op.
    pub fn release(&self, key: &str, worker_id: &str) -> StateResult<bool> {
        self.state.update_case(key, |item| match &item.lease {
            Some(lease) if lease.worker_id == worker_id => {
                item.lease = None;
                true
            }
            _ => false,
        })
    }

    /// Extend the lease's expiry to `now + ttl_secs`, but only while
    /// `worker_id` holds a live lease. An expired lease cannot be
    /// renewed — it must be re-acquired.
    pub fn renew(
        &self,
        key: &str,
        worker_id: &str,
        ttl_secs: u64,
        now: u64,
    ) -> StateResult<bool> {
        self.state.update_case(key, |item| match &mut item.lease {
            Some(lease) if lease.worker_id == worker_id && !lease.is_expired(now) => {
                lease.expires_at = now + ttl_secs;
                true
            }
            _ => false,
        })
    }
}
