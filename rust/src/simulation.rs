//! Monte Carlo simulation of project completion time.
//!
//! Each trial samples every task's duration uniformly between its optimistic
//! and pessimistic estimates, rounds it to a whole unit and runs the
//! topological CPM pass on the resulting fixed-duration network. This is a
//! deliberate simplification of the PERT beta model: the sampled mean is the
//! midpoint of each range, not the PERT expected duration.

#[cfg(feature = "python")]
use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::critical_path::calculation::{topological_pass, Topology};
use crate::critical_path::ScheduleError;
use crate::graph::PertGraph;
use crate::logging::VERBOSITY_SILENT;
use crate::models::PertTask;
use crate::statistics::{percentile, Summary};
use crate::{log_changes, log_debug};

/// Increment between per-trial seeds (2^64 / golden ratio).
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Distribution of simulated project durations.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationResult {
    #[cfg_attr(feature = "python", pyo3(get))]
    pub trials: usize,
    /// Total duration of each trial, in trial order.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub samples: Vec<i64>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub min: i64,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub max: i64,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub mean: f64,
    /// Population standard deviation of the samples.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub standard_deviation: f64,
    /// Base seed the trials were drawn from; rerunning with it reproduces
    /// the samples exactly.
    #[cfg_attr(feature = "python", pyo3(get))]
    pub seed: Option<u64>,
}

impl SimulationResult {
    fn samples_f64(&self) -> Vec<f64> {
        self.samples.iter().map(|&x| x as f64).collect()
    }

    /// Interpolated percentile of the sampled durations, `p` in `[0, 100]`.
    ///
    /// Returns 0.0 for an empty result or an out-of-range `p`.
    pub fn percentile(&self, p: f64) -> f64 {
        percentile(&self.samples_f64(), p)
    }

    /// Fraction of trials that finished within `target`.
    pub fn probability_within(&self, target: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let hits = self.samples.iter().filter(|&&x| x as f64 <= target).count();
        hits as f64 / self.samples.len() as f64
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl SimulationResult {
    #[pyo3(name = "percentile")]
    fn py_percentile(&self, p: f64) -> f64 {
        self.percentile(p)
    }

    #[pyo3(name = "probability_within")]
    fn py_probability_within(&self, target: f64) -> f64 {
        self.probability_within(target)
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationResult(trials={}, mean={:.3}, standard_deviation={:.3}, min={}, max={})",
            self.trials, self.mean, self.standard_deviation, self.min, self.max
        )
    }
}

/// Seed of trial `trial`'s random stream.
fn trial_seed(seed: u64, trial: usize) -> u64 {
    seed.wrapping_add((trial as u64).wrapping_mul(SEED_STRIDE))
}

/// Uniform draw from `[low, high]`, rounded to the nearest whole unit.
fn sample_duration<R: Rng>(rng: &mut R, low: u32, high: u32) -> i64 {
    if low == high {
        return i64::from(low);
    }
    rng.gen_range(f64::from(low)..=f64::from(high)).round() as i64
}

/// Run one trial on its own random stream and return the project duration.
fn run_trial(
    topology: &Topology,
    ranges: &[(u32, u32)],
    seed: u64,
    trial: usize,
) -> Result<i64, ScheduleError> {
    let mut rng = StdRng::seed_from_u64(trial_seed(seed, trial));
    let durations: Vec<i64> = ranges
        .iter()
        .map(|&(low, high)| sample_duration(&mut rng, low, high))
        .collect();
    let pass = topological_pass(topology, &durations, VERBOSITY_SILENT)?;
    Ok(pass.total)
}

/// Simulate `trials` project runs with default settings.
///
/// An empty graph or zero trials yields an empty result.
///
/// # Errors
/// * `ScheduleError::CircularDependency` if the graph has a cycle
pub fn simulate(graph: &PertGraph, trials: usize) -> Result<SimulationResult, ScheduleError> {
    simulate_with_config(graph, &SimulationConfig::with_trials(trials))
}

/// Simulate project runs as described by `config`.
///
/// Trials are independent: each draws from its own stream seeded by
/// `(seed, trial index)` and writes only its own sample, so the parallel and
/// sequential runs produce the same samples for the same seed.
pub fn simulate_with_config(
    graph: &PertGraph,
    config: &SimulationConfig,
) -> Result<SimulationResult, ScheduleError> {
    if graph.is_empty() || config.trials == 0 {
        return Ok(SimulationResult::default());
    }

    let topology = Topology::new(graph);
    let ranges: Vec<(u32, u32)> = graph.iter().map(PertTask::range).collect();
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());

    let run = |trial: usize| {
        let total = run_trial(&topology, &ranges, seed, trial);
        if let Ok(total) = &total {
            log_debug!(config.verbosity, "Trial {}: total duration {}", trial, total);
        }
        total
    };

    let (samples, summary) = if config.parallel {
        let samples = (0..config.trials)
            .into_par_iter()
            .map(run)
            .collect::<Result<Vec<i64>, ScheduleError>>()?;
        let summary = samples
            .par_iter()
            .fold(Summary::default, |mut summary, &x| {
                summary.push(x as f64);
                summary
            })
            .reduce(Summary::default, Summary::merge);
        (samples, summary)
    } else {
        let samples = (0..config.trials)
            .map(run)
            .collect::<Result<Vec<i64>, ScheduleError>>()?;
        let summary = samples.iter().fold(Summary::default(), |mut summary, &x| {
            summary.push(x as f64);
            summary
        });
        (samples, summary)
    };

    let result = SimulationResult {
        trials: config.trials,
        min: summary.min as i64,
        max: summary.max as i64,
        mean: summary.mean,
        standard_deviation: summary.standard_deviation(),
        seed: Some(seed),
        samples,
    };

    log_changes!(
        config.verbosity,
        "Monte Carlo: {} trials (seed {}), mean {:.3}, std dev {:.3}, range [{}, {}]",
        result.trials,
        seed,
        result.mean,
        result.standard_deviation,
        result.min,
        result.max
    );
    Ok(result)
}
