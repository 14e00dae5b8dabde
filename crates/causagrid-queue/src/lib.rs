//! causagrid-queue — brokerless work distribution over the record store.
//!
//! Many independent workers share the case backlog without a central
//! queue process. Coordination happens entirely through the store's
//! atomic conditional updates:
//!
//! - [`LeaseManager`] — claim, renew, and release a time-bounded
//!   exclusive lease on one case. Contention is an ordinary outcome,
//!   never an error; callers skip to the next candidate.
//! - [`CooldownController`] — per-case consecutive-failure counter
//!   that parks a repeatedly failing case behind a `skip_until`
//!   window. Advisory only: the selector honors it, nothing blocks.
//! - [`EligibilitySelector`] — composes lock state, cooldown state,
//!   and business filters into an oldest-first candidate page, plus
//!   the backlog count the autoscaler consumes.
//!
//! Selection never claims: callers race through `acquire` and move on
//! when they lose.

pub mod cooldown;
pub mod lease;
pub mod selector;

pub use cooldown::{CooldownConfig, CooldownController, CooldownOutcome};
pub use lease::{LeaseManager, LeaseOutcome};
pub use selector::{EligibilitySelector, SelectorConfig};
