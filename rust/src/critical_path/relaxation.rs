//! Order-independent critical path calculation by iterative edge relaxation.
//!
//! Computes the same schedule as the topological engine without building a
//! topological order, so the two can validate each other.

use crate::config::AnalysisConfig;
use crate::graph::CpmGraph;
use crate::{log_changes, log_checks, log_debug};

use super::calculation::{build_cpm_result, durations, PassResult, Topology};
use super::types::{CpmResult, ScheduleError, TaskTiming};

/// Early start of a task no relaxation has reached yet.
///
/// Far below any attainable time, with headroom so adding a duration cannot
/// overflow.
const UNREACHED: i64 = i64::MIN / 4;

/// Relax early starts along every edge until a fixed point.
///
/// Returns whether the last round still changed something, i.e. whether the
/// round budget ran out before convergence.
fn relax_forward(
    topology: &Topology,
    durations: &[i64],
    timings: &mut [TaskTiming],
    rounds: usize,
    verbosity: u8,
) -> bool {
    for round in 0..rounds {
        let mut updated = false;
        for idx in 0..timings.len() {
            let start = timings[idx].earliest_start;
            if start == UNREACHED {
                continue;
            }
            let finish = start + durations[idx];
            for &succ in &topology.successors[idx] {
                let successor = &mut timings[succ];
                if finish > successor.earliest_start {
                    successor.earliest_start = finish;
                    successor.earliest_finish = finish + durations[succ];
                    updated = true;
                    log_debug!(
                        verbosity,
                        "  round {}: ES({}) raised to {} via {}",
                        round,
                        topology.ids[succ],
                        finish,
                        topology.ids[idx]
                    );
                }
            }
        }
        if !updated {
            log_checks!(verbosity, "Forward relaxation converged after {} rounds", round);
            return false;
        }
    }
    edges_still_relax(topology, |idx, succ| {
        timings[idx].earliest_start != UNREACHED
            && timings[idx].earliest_start + durations[idx] > timings[succ].earliest_start
    })
}

/// Tighten late finishes along every edge until a fixed point.
fn relax_backward(
    topology: &Topology,
    durations: &[i64],
    timings: &mut [TaskTiming],
    rounds: usize,
    verbosity: u8,
) -> bool {
    for round in 0..rounds {
        let mut updated = false;
        // Descending index order, so a chain laid out by ascending id settles in one round
        for idx in (0..timings.len()).rev() {
            for &succ in &topology.successors[idx] {
                let candidate = timings[succ].latest_start;
                let timing = &mut timings[idx];
                if candidate < timing.latest_finish {
                    timing.latest_finish = candidate;
                    timing.latest_start = candidate - durations[idx];
                    updated = true;
                    log_debug!(
                        verbosity,
                        "  round {}: LF({}) lowered to {} via {}",
                        round,
                        topology.ids[idx],
                        candidate,
                        topology.ids[succ]
                    );
                }
            }
        }
        if !updated {
            log_checks!(verbosity, "Backward relaxation converged after {} rounds", round);
            return false;
        }
    }
    edges_still_relax(topology, |idx, succ| {
        timings[succ].latest_start < timings[idx].latest_finish
    })
}

fn edges_still_relax(topology: &Topology, mut relaxes: impl FnMut(usize, usize) -> bool) -> bool {
    topology
        .successors
        .iter()
        .enumerate()
        .any(|(idx, succs)| succs.iter().any(|&succ| relaxes(idx, succ)))
}

/// Bellman-Ford style forward and backward pass.
///
/// Roots start at zero, everything else at `UNREACHED`. At most `n - 1`
/// rounds raise each successor's early start to the finish of any reached
/// predecessor, stopping early at a fixed point. Late finishes start at the
/// project total and are lowered to successors' late starts the same way.
///
/// A task that is never reached, or relaxation that is still changing after
/// `n - 1` rounds, means the graph has a cycle. A zero-length cycle hanging off
/// a reachable task converges and is not detected here.
fn relaxation_pass(
    topology: &Topology,
    durations: &[i64],
    verbosity: u8,
) -> Result<PassResult<i64>, ScheduleError> {
    let n = topology.len();
    let rounds = n.saturating_sub(1);

    let mut timings: Vec<TaskTiming> = (0..n)
        .map(|idx| {
            let start = if topology.predecessors[idx].is_empty() {
                0
            } else {
                UNREACHED
            };
            TaskTiming {
                earliest_start: start,
                earliest_finish: start + durations[idx],
                ..TaskTiming::default()
            }
        })
        .collect();

    let diverged = relax_forward(topology, durations, &mut timings, rounds, verbosity);
    let visited: Vec<bool> = timings
        .iter()
        .map(|timing| timing.earliest_start != UNREACHED)
        .collect();
    if diverged || visited.contains(&false) {
        let settled = if diverged {
            // Tasks whose early start would still move are on or behind the cycle
            let mut settled = vec![true; n];
            for (idx, succs) in topology.successors.iter().enumerate() {
                let start = timings[idx].earliest_start;
                for &succ in succs {
                    if start != UNREACHED && start + durations[idx] > timings[succ].earliest_start {
                        settled[succ] = false;
                    }
                }
            }
            settled
        } else {
            visited
        };
        let unvisited = topology.unvisited(&settled);
        log_changes!(
            verbosity,
            "Relaxation pass found a cycle; affected tasks: {:?}",
            unvisited
        );
        return Err(ScheduleError::CircularDependency { unvisited });
    }

    let total = timings
        .iter()
        .map(|timing| timing.earliest_finish)
        .fold(0, i64::max);

    for (idx, timing) in timings.iter_mut().enumerate() {
        timing.latest_finish = total;
        timing.latest_start = total - durations[idx];
    }

    // Backward relaxation cannot diverge once the forward pass converged.
    relax_backward(topology, durations, &mut timings, rounds, verbosity);

    for (idx, timing) in timings.iter_mut().enumerate() {
        timing.slack = timing.latest_finish - timing.earliest_finish;
        log_checks!(
            verbosity,
            "Task {}: ES={} EF={} LS={} LF={} slack={}",
            topology.ids[idx],
            timing.earliest_start,
            timing.earliest_finish,
            timing.latest_start,
            timing.latest_finish,
            timing.slack
        );
    }

    Ok(PassResult { timings, total })
}

/// Analyze a fixed-duration task graph with the relaxation engine.
///
/// For any acyclic graph the result equals [`super::analyze_topological`]'s.
///
/// # Errors
/// * `ScheduleError::CircularDependency` if a task is unreachable from every
///   root or relaxation does not converge
pub fn analyze_relaxation(graph: &CpmGraph) -> Result<CpmResult, ScheduleError> {
    analyze_relaxation_with_config(graph, &AnalysisConfig::default())
}

/// [`analyze_relaxation`] with explicit configuration.
pub fn analyze_relaxation_with_config(
    graph: &CpmGraph,
    config: &AnalysisConfig,
) -> Result<CpmResult, ScheduleError> {
    if graph.is_empty() {
        return Ok(CpmResult::default());
    }

    let topology = Topology::new(graph);
    let pass = relaxation_pass(&topology, &durations(graph), config.verbosity)?;
    let result = build_cpm_result(&topology, &pass, config);

    log_changes!(
        config.verbosity,
        "Relaxation CPM: {} tasks, total duration {}, critical path {:?}",
        graph.len(),
        result.total_duration,
        result.critical_path
    );
    Ok(result)
}
