//! Types for critical path analysis.

use std::collections::BTreeMap;

#[cfg(feature = "python")]
use pyo3::prelude::*;
use thiserror::Error;

use crate::models::{Span, TaskId, DEFAULT_SLACK_TOLERANCE};

/// Errors that can occur during schedule analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The graph is not acyclic; `unvisited` lists the tasks the pass could
    /// not place (members of a cycle or downstream of one), ascending.
    #[error("Circular dependency detected: tasks {unvisited:?} could not be scheduled")]
    CircularDependency { unvisited: Vec<TaskId> },
}

/// Per-task schedule produced by a forward/backward pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timing<S> {
    /// Earliest possible start time (from forward pass).
    pub earliest_start: S,
    /// Earliest possible finish time (from forward pass).
    pub earliest_finish: S,
    /// Latest allowable start time (from backward pass).
    pub latest_start: S,
    /// Latest allowable finish time (from backward pass).
    pub latest_finish: S,
    /// Slack = latest_finish - earliest_finish.
    pub slack: S,
}

/// Integer schedule of a fixed-duration task.
pub type TaskTiming = Timing<i64>;

/// Floating-point schedule of a PERT task.
pub type PertTiming = Timing<f64>;

impl<S: Span> Timing<S> {
    pub fn is_critical(&self) -> bool {
        self.is_critical_within(DEFAULT_SLACK_TOLERANCE)
    }

    /// Zero-slack test with an explicit tolerance (ignored for integers).
    pub fn is_critical_within(&self, tolerance: f64) -> bool {
        self.slack.is_zero(tolerance)
    }
}

/// Result of a deterministic critical path analysis.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CpmResult {
    /// Project duration: the latest early finish of any sink task.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub total_duration: i64,
    /// Single critical chain built greedily over zero-slack tasks by early start.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub critical_path: Vec<TaskId>,
    /// Every maximal chain of the zero-slack subgraph, lexicographic by id.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub critical_paths: Vec<Vec<TaskId>>,
    /// Computed schedule for every task.
    pub schedule: BTreeMap<TaskId, TaskTiming>,
}

impl CpmResult {
    pub fn timing(&self, id: TaskId) -> Option<&TaskTiming> {
        self.schedule.get(&id)
    }

    /// Ids of all zero-slack tasks, ascending.
    pub fn critical_tasks(&self) -> Vec<TaskId> {
        self.schedule
            .iter()
            .filter(|(_, timing)| timing.is_critical())
            .map(|(&id, _)| id)
            .collect()
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl CpmResult {
    /// Computed schedule keyed by task id.
    #[pyo3(name = "schedule")]
    fn py_schedule(&self) -> BTreeMap<TaskId, crate::python::PyTaskTiming> {
        self.schedule
            .iter()
            .map(|(&id, &timing)| (id, timing.into()))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "CpmResult(total_duration={}, critical_path={:?})",
            self.total_duration, self.critical_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_timing_critical() {
        let timing = TaskTiming {
            earliest_start: 0,
            earliest_finish: 5,
            latest_start: 0,
            latest_finish: 5,
            slack: 0,
        };
        assert!(timing.is_critical());

        let timing_with_slack = TaskTiming {
            earliest_start: 0,
            earliest_finish: 5,
            latest_start: 2,
            latest_finish: 7,
            slack: 2,
        };
        assert!(!timing_with_slack.is_critical());
    }

    #[test]
    fn test_pert_timing_tolerance() {
        let timing = PertTiming {
            earliest_start: 1.0,
            earliest_finish: 4.0,
            latest_start: 1.0 + 1e-9,
            latest_finish: 4.0 + 1e-9,
            slack: 1e-9,
        };
        assert!(timing.is_critical());
        assert!(!timing.is_critical_within(1e-12));
    }

    #[test]
    fn test_cycle_error_message() {
        let err = ScheduleError::CircularDependency {
            unvisited: vec![2, 3],
        };
        assert_eq!(
            err.to_string(),
            "Circular dependency detected: tasks [2, 3] could not be scheduled"
        );
    }
}
