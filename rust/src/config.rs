//! Configuration types for the analysis engines.

#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::models::DEFAULT_SLACK_TOLERANCE;

/// Configuration shared by the CPM and PERT engines.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Absolute tolerance for treating floating-point slack as zero (PERT only)
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub slack_tolerance: f64,
    /// Upper bound on the number of critical chains enumerated per result
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub max_critical_paths: usize,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub verbosity: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            slack_tolerance: DEFAULT_SLACK_TOLERANCE,
            max_critical_paths: 64,
            verbosity: 0,
        }
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl AnalysisConfig {
    #[new]
    #[pyo3(signature = (slack_tolerance=None, max_critical_paths=None, verbosity=None))]
    fn py_new(
        slack_tolerance: Option<f64>,
        max_critical_paths: Option<usize>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            slack_tolerance: slack_tolerance.unwrap_or(defaults.slack_tolerance),
            max_critical_paths: max_critical_paths.unwrap_or(defaults.max_critical_paths),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "AnalysisConfig(slack_tolerance={}, max_critical_paths={}, verbosity={})",
            self.slack_tolerance, self.max_critical_paths, self.verbosity
        )
    }
}

/// Configuration for the Monte Carlo simulator.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Number of trials to run (0 yields an empty result)
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub trials: usize,
    /// Base seed; trial `i` draws from a stream derived from `(seed, i)`.
    /// `None` picks a fresh seed per run.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub seed: Option<u64>,
    /// Run trials on the rayon thread pool
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub parallel: bool,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub verbosity: u8,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            seed: None,
            parallel: true,
            verbosity: 0,
        }
    }
}

impl SimulationConfig {
    /// Default configuration with the given trial count.
    pub fn with_trials(trials: usize) -> Self {
        Self {
            trials,
            ..Self::default()
        }
    }

    /// Same configuration with a fixed base seed.
    pub fn seeded(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl SimulationConfig {
    #[new]
    #[pyo3(signature = (trials=None, seed=None, parallel=None, verbosity=None))]
    fn py_new(
        trials: Option<usize>,
        seed: Option<u64>,
        parallel: Option<bool>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            trials: trials.unwrap_or(defaults.trials),
            seed,
            parallel: parallel.unwrap_or(defaults.parallel),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationConfig(trials={}, seed={:?}, parallel={})",
            self.trials, self.seed, self.parallel
        )
    }
}
