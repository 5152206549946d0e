//! Deterministic critical path analysis.
//!
//! Two independent engines compute the same schedule for any acyclic graph:
//! a dynamic-programming pass over a Kahn topological order, and an
//! order-independent Bellman-Ford style relaxation used as a cross-check.

pub(crate) mod calculation;
mod extraction;
mod relaxation;
mod types;

pub use calculation::{analyze_topological, analyze_topological_with_config};
pub use relaxation::{analyze_relaxation, analyze_relaxation_with_config};
pub use types::{CpmResult, PertTiming, ScheduleError, TaskTiming, Timing};

pub(crate) use extraction::{critical_chains, greedy_critical_path};
