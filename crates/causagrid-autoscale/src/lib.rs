//! causagrid-autoscale — backlog-driven fleet scaling.
//!
//! A pure decision function compares each fuero's eligible backlog
//! against the scaling thresholds, and [`AutoscalingManager`] runs it
//! on an interval: sampling worker counts and system resources through
//! callbacks, persisting a bounded history of snapshots, and raising
//! operational alerts. The manager only recommends worker counts — it
//! never starts or stops processes itself.

pub mod decision;
pub mod manager;

pub use decision::{Decision, decide, within_working_hours};
pub use manager::{AutoscalingManager, ResourceSampleFn, WorkerCountFn};
