//! Scheduling metrics for project task networks.
//!
//! Computes early/late start and finish times, slack, project duration and the
//! critical path for directed acyclic task graphs, either with fixed durations
//! (CPM) or three-point estimates (PERT), plus a Monte Carlo simulation of the
//! completion-time distribution.
//!
//! The engines take a [`TaskGraph`] and return fresh result records; task
//! definitions are never mutated, so the same graph can be analyzed repeatedly
//! or from several threads at once.

// Allow clippy warning triggered by PyO3 macro expansion
#![cfg_attr(feature = "python", allow(clippy::useless_conversion))]

pub mod config;
pub mod critical_path;
pub mod graph;
pub mod logging;
pub mod models;
pub mod pert;
pub mod simulation;
pub mod statistics;

#[cfg(feature = "python")]
mod python;

pub use config::{AnalysisConfig, SimulationConfig};
pub use critical_path::{
    analyze_relaxation, analyze_relaxation_with_config, analyze_topological,
    analyze_topological_with_config, CpmResult, PertTiming, ScheduleError, TaskTiming, Timing,
};
pub use graph::{CpmGraph, GraphError, PertGraph, TaskGraph};
pub use models::{Activity, PertTask, Span, Task, TaskId, DEFAULT_SLACK_TOLERANCE};
pub use pert::{analyze_pert, analyze_pert_with_config, PertResult, ProjectTarget, TargetAnalysis};
pub use simulation::{simulate, simulate_with_config, SimulationResult};
pub use statistics::{normal_cdf, normal_inv_cdf, on_time_probability, percentile, Summary};
