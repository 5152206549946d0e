//! Python bindings (feature `python`).

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{AnalysisConfig, SimulationConfig};
use crate::critical_path::{
    analyze_relaxation_with_config, analyze_topological_with_config, CpmResult, PertTiming,
    TaskTiming,
};
use crate::graph::{CpmGraph, PertGraph};
use crate::models::{PertTask, Task};
use crate::pert::{analyze_pert_with_config, PertResult, ProjectTarget, TargetAnalysis};
use crate::simulation::{simulate_with_config, SimulationResult};
use crate::statistics;

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Integer task schedule (PyO3 wrapper).
#[pyclass(name = "TaskTiming")]
#[derive(Clone, Debug)]
pub struct PyTaskTiming {
    #[pyo3(get)]
    pub earliest_start: i64,
    #[pyo3(get)]
    pub earliest_finish: i64,
    #[pyo3(get)]
    pub latest_start: i64,
    #[pyo3(get)]
    pub latest_finish: i64,
    #[pyo3(get)]
    pub slack: i64,
}

impl From<TaskTiming> for PyTaskTiming {
    fn from(timing: TaskTiming) -> Self {
        Self {
            earliest_start: timing.earliest_start,
            earliest_finish: timing.earliest_finish,
            latest_start: timing.latest_start,
            latest_finish: timing.latest_finish,
            slack: timing.slack,
        }
    }
}

#[pymethods]
impl PyTaskTiming {
    fn is_critical(&self) -> bool {
        self.slack == 0
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskTiming(es={}, ef={}, ls={}, lf={}, slack={})",
            self.earliest_start,
            self.earliest_finish,
            self.latest_start,
            self.latest_finish,
            self.slack
        )
    }
}

/// Floating-point PERT task schedule (PyO3 wrapper).
#[pyclass(name = "PertTiming")]
#[derive(Clone, Debug)]
pub struct PyPertTiming {
    #[pyo3(get)]
    pub earliest_start: f64,
    #[pyo3(get)]
    pub earliest_finish: f64,
    #[pyo3(get)]
    pub latest_start: f64,
    #[pyo3(get)]
    pub latest_finish: f64,
    #[pyo3(get)]
    pub slack: f64,
}

impl From<PertTiming> for PyPertTiming {
    fn from(timing: PertTiming) -> Self {
        Self {
            earliest_start: timing.earliest_start,
            earliest_finish: timing.earliest_finish,
            latest_start: timing.latest_start,
            latest_finish: timing.latest_finish,
            slack: timing.slack,
        }
    }
}

#[pymethods]
impl PyPertTiming {
    #[pyo3(signature = (tolerance=crate::models::DEFAULT_SLACK_TOLERANCE))]
    fn is_critical(&self, tolerance: f64) -> bool {
        self.slack.abs() < tolerance
    }

    fn __repr__(&self) -> String {
        format!(
            "PertTiming(es={:.3}, ef={:.3}, ls={:.3}, lf={:.3}, slack={:.3})",
            self.earliest_start,
            self.earliest_finish,
            self.latest_start,
            self.latest_finish,
            self.slack
        )
    }
}

/// Run the topological CPM engine.
///
/// # Arguments
/// * `tasks` - Tasks with their predecessor lists
/// * `config` - Optional analysis configuration
///
/// # Raises
/// * ValueError on unknown/duplicate ids or a circular dependency
#[pyfunction]
#[pyo3(name = "analyze_topological", signature = (tasks, config=None))]
fn py_analyze_topological(
    py: Python<'_>,
    tasks: Vec<Task>,
    config: Option<AnalysisConfig>,
) -> PyResult<CpmResult> {
    let graph = CpmGraph::from_tasks(tasks).map_err(value_error)?;
    let config = config.unwrap_or_default();
    py.allow_threads(|| analyze_topological_with_config(&graph, &config))
        .map_err(value_error)
}

/// Run the relaxation CPM engine. Same contract as `analyze_topological`.
#[pyfunction]
#[pyo3(name = "analyze_relaxation", signature = (tasks, config=None))]
fn py_analyze_relaxation(
    py: Python<'_>,
    tasks: Vec<Task>,
    config: Option<AnalysisConfig>,
) -> PyResult<CpmResult> {
    let graph = CpmGraph::from_tasks(tasks).map_err(value_error)?;
    let config = config.unwrap_or_default();
    py.allow_threads(|| analyze_relaxation_with_config(&graph, &config))
        .map_err(value_error)
}

/// Run the PERT engine on three-point estimated tasks.
#[pyfunction]
#[pyo3(name = "analyze_pert", signature = (tasks, config=None))]
fn py_analyze_pert(
    py: Python<'_>,
    tasks: Vec<PertTask>,
    config: Option<AnalysisConfig>,
) -> PyResult<PertResult> {
    let graph = PertGraph::from_tasks(tasks).map_err(value_error)?;
    let config = config.unwrap_or_default();
    py.allow_threads(|| analyze_pert_with_config(&graph, &config))
        .map_err(value_error)
}

/// Monte Carlo simulation of the project duration.
///
/// # Arguments
/// * `tasks` - Three-point estimated tasks with their predecessor lists
/// * `trials` - Number of trials (0 returns an empty result)
/// * `config` - Optional simulation configuration; `trials` overrides its trial count
#[pyfunction]
#[pyo3(name = "simulate", signature = (tasks, trials, config=None))]
fn py_simulate(
    py: Python<'_>,
    tasks: Vec<PertTask>,
    trials: usize,
    config: Option<SimulationConfig>,
) -> PyResult<SimulationResult> {
    let graph = PertGraph::from_tasks(tasks).map_err(value_error)?;
    let config = SimulationConfig {
        trials,
        ..config.unwrap_or_default()
    };
    py.allow_threads(|| simulate_with_config(&graph, &config))
        .map_err(value_error)
}

#[pyfunction]
#[pyo3(name = "normal_cdf")]
fn py_normal_cdf(z: f64) -> f64 {
    statistics::normal_cdf(z)
}

#[pyfunction]
#[pyo3(name = "normal_inv_cdf")]
fn py_normal_inv_cdf(p: f64) -> f64 {
    statistics::normal_inv_cdf(p)
}

#[pyfunction]
#[pyo3(name = "on_time_probability")]
fn py_on_time_probability(expected: f64, standard_deviation: f64, target: f64) -> f64 {
    statistics::on_time_probability(expected, standard_deviation, target)
}

/// The taskpert.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Task>()?;
    m.add_class::<PertTask>()?;
    m.add_class::<PyTaskTiming>()?;
    m.add_class::<PyPertTiming>()?;
    m.add_class::<CpmResult>()?;
    m.add_class::<PertResult>()?;
    m.add_class::<SimulationResult>()?;
    m.add_class::<ProjectTarget>()?;
    m.add_class::<TargetAnalysis>()?;

    // Config types
    m.add_class::<AnalysisConfig>()?;
    m.add_class::<SimulationConfig>()?;

    // Engines
    m.add_function(wrap_pyfunction!(py_analyze_topological, m)?)?;
    m.add_function(wrap_pyfunction!(py_analyze_relaxation, m)?)?;
    m.add_function(wrap_pyfunction!(py_analyze_pert, m)?)?;
    m.add_function(wrap_pyfunction!(py_simulate, m)?)?;

    // Probability helpers
    m.add_function(wrap_pyfunction!(py_normal_cdf, m)?)?;
    m.add_function(wrap_pyfunction!(py_normal_inv_cdf, m)?)?;
    m.add_function(wrap_pyfunction!(py_on_time_probability, m)?)?;

    Ok(())
}
