//! PERT analysis: expected project duration and completion-time spread from
//! three-point estimates.

use std::collections::BTreeMap;

#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::config::AnalysisConfig;
use crate::critical_path::calculation::{durations, topological_pass, Topology};
use crate::critical_path::{critical_chains, greedy_critical_path, PertTiming, ScheduleError};
use crate::graph::PertGraph;
use crate::log_changes;
use crate::models::TaskId;
use crate::statistics::{normal_inv_cdf, on_time_probability};

/// Result of a PERT analysis.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PertResult {
    /// Latest expected early finish of any sink task.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub expected_duration: f64,
    /// Sum of task variances along `critical_path`.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub variance: f64,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub standard_deviation: f64,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub critical_path: Vec<TaskId>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub critical_paths: Vec<Vec<TaskId>>,
    pub schedule: BTreeMap<TaskId, PertTiming>,
}

/// Completion goal to evaluate a PERT result against.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectTarget {
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub target_time: f64,
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub target_probability: f64,
}

/// Probabilistic outlook of a PERT result for a [`ProjectTarget`].
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetAnalysis {
    /// Chance of finishing by `target_time`.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub on_time_probability: f64,
    /// Duration met with probability `target_probability`.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub time_for_probability: f64,
}

impl PertResult {
    pub fn timing(&self, id: TaskId) -> Option<&PertTiming> {
        self.schedule.get(&id)
    }

    /// Chance of finishing by `target` under the normal approximation.
    pub fn on_time_probability(&self, target: f64) -> f64 {
        on_time_probability(self.expected_duration, self.standard_deviation, target)
    }

    /// Duration that is met with the given probability.
    pub fn time_for_probability(&self, probability: f64) -> f64 {
        self.expected_duration + self.standard_deviation * normal_inv_cdf(probability)
    }

    pub fn target_analysis(&self, target: &ProjectTarget) -> TargetAnalysis {
        TargetAnalysis {
            on_time_probability: self.on_time_probability(target.target_time),
            time_for_probability: self.time_for_probability(target.target_probability),
        }
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl PertResult {
    /// Computed schedule keyed by task id.
    #[pyo3(name = "schedule")]
    fn py_schedule(&self) -> BTreeMap<TaskId, crate::python::PyPertTiming> {
        self.schedule
            .iter()
            .map(|(&id, &timing)| (id, timing.into()))
            .collect()
    }

    #[pyo3(name = "on_time_probability")]
    fn py_on_time_probability(&self, target: f64) -> f64 {
        self.on_time_probability(target)
    }

    #[pyo3(name = "time_for_probability")]
    fn py_time_for_probability(&self, probability: f64) -> f64 {
        self.time_for_probability(probability)
    }

    #[pyo3(name = "target_analysis")]
    fn py_target_analysis(&self, target: ProjectTarget) -> TargetAnalysis {
        self.target_analysis(&target)
    }

    fn __repr__(&self) -> String {
        format!(
            "PertResult(expected_duration={:.3}, standard_deviation={:.3}, critical_path={:?})",
            self.expected_duration, self.standard_deviation, self.critical_path
        )
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl ProjectTarget {
    #[new]
    fn py_new(target_time: f64, target_probability: f64) -> Self {
        Self {
            target_time,
            target_probability,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ProjectTarget(target_time={}, target_probability={})",
            self.target_time, self.target_probability
        )
    }
}

/// Analyze a PERT graph using expected durations.
///
/// An empty graph yields a zero-value result.
///
/// # Errors
/// * `ScheduleError::CircularDependency` if the graph has a cycle
pub fn analyze_pert(graph: &PertGraph) -> Result<PertResult, ScheduleError> {
    analyze_pert_with_config(graph, &AnalysisConfig::default())
}

/// [`analyze_pert`] with explicit configuration.
///
/// Runs the topological forward/backward pass in floating point. Slack is
/// compared against zero with `config.slack_tolerance`. Variance accumulates
/// over the greedy critical path only.
pub fn analyze_pert_with_config(
    graph: &PertGraph,
    config: &AnalysisConfig,
) -> Result<PertResult, ScheduleError> {
    if graph.is_empty() {
        return Ok(PertResult::default());
    }

    let topology = Topology::new(graph);
    let pass = topological_pass(&topology, &durations(graph), config.verbosity)?;

    let critical_path = greedy_critical_path(&topology, &pass.timings, config.slack_tolerance);
    let variance: f64 = critical_path
        .iter()
        .filter_map(|&id| graph.get(id))
        .map(|task| task.variance())
        .sum();

    let result = PertResult {
        expected_duration: pass.total,
        variance,
        standard_deviation: variance.sqrt(),
        critical_paths: critical_chains(
            &topology,
            &pass.timings,
            config.slack_tolerance,
            config.max_critical_paths,
        ),
        critical_path,
        schedule: pass.schedule(&topology),
    };

    log_changes!(
        config.verbosity,
        "PERT: {} tasks, expected duration {:.3}, std dev {:.3}, critical path {:?}",
        graph.len(),
        result.expected_duration,
        result.standard_deviation,
        result.critical_path
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PertTask;

    fn diamond() -> PertGraph {
        // Expected: 1 -> 1.0, 2 -> 5.0, 3 -> 2.0, 4 -> 1.0
        PertGraph::from_tasks([
            PertTask::new(1, 1, 1, 1),
            PertTask::new(2, 2, 5, 8).with_predecessors([1]),
            PertTask::new(3, 1, 2, 3).with_predecessors([1]),
            PertTask::new(4, 0, 1, 2).with_predecessors([2, 3]),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let result = analyze_pert(&PertGraph::new()).unwrap();
        assert_eq!(result.expected_duration, 0.0);
        assert_eq!(result.variance, 0.0);
        assert!(result.critical_path.is_empty());
    }

    #[test]
    fn test_single_task_statistics() {
        let graph = PertGraph::from_tasks([PertTask::new(1, 2, 4, 6)]).unwrap();
        let result = analyze_pert(&graph).unwrap();

        assert_eq!(result.expected_duration, 4.0);
        assert!((result.variance - 4.0 / 9.0).abs() < 1e-12);
        assert!((result.standard_deviation - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.critical_path, vec![1]);
    }

    #[test]
    fn test_diamond_expected_schedule() {
        let result = analyze_pert(&diamond()).unwrap();

        assert!((result.expected_duration - 7.0).abs() < 1e-9);
        assert_eq!(result.critical_path, vec![1, 2, 4]);
        assert_eq!(result.critical_paths, vec![vec![1, 2, 4]]);
        assert!((result.timing(3).unwrap().slack - 3.0).abs() < 1e-9);

        // Variance of 1 (0), 2 (1.0) and 4 (1/9); task 3 is off the path
        assert!((result.variance - (1.0 + 1.0 / 9.0)).abs() < 1e-12);
        assert!((result.standard_deviation - result.variance.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_fractional_durations_stay_critical() {
        // 1/6 steps accumulate rounding error; tolerance keeps the chain intact
        let graph = PertGraph::from_tasks([
            PertTask::new(1, 0, 0, 1),
            PertTask::new(2, 0, 0, 1).with_predecessors([1]),
            PertTask::new(3, 0, 0, 1).with_predecessors([2]),
            PertTask::new(4, 0, 0, 1).with_predecessors([3]),
            PertTask::new(5, 0, 0, 1).with_predecessors([4]),
            PertTask::new(6, 0, 0, 1).with_predecessors([5]),
        ])
        .unwrap();
        let result = analyze_pert(&graph).unwrap();

        assert!((result.expected_duration - 1.0).abs() < 1e-9);
        assert_eq!(result.critical_path, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_target_analysis() {
        let graph = PertGraph::from_tasks([PertTask::new(1, 4, 10, 16)]).unwrap();
        let result = analyze_pert(&graph).unwrap();
        assert_eq!(result.expected_duration, 10.0);
        assert!((result.standard_deviation - 2.0).abs() < 1e-12);

        let analysis = result.target_analysis(&ProjectTarget {
            target_time: 10.0,
            target_probability: 0.5,
        });
        assert!((analysis.on_time_probability - 0.5).abs() < 1e-12);
        assert!((analysis.time_for_probability - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_target() {
        let graph = PertGraph::from_tasks([PertTask::new(1, 10, 10, 10)]).unwrap();
        let result = analyze_pert(&graph).unwrap();

        assert_eq!(result.standard_deviation, 0.0);
        assert_eq!(result.on_time_probability(10.0), 1.0);
        assert_eq!(result.on_time_probability(9.0), 0.0);
        assert_eq!(result.time_for_probability(0.95), 10.0);
    }
}
