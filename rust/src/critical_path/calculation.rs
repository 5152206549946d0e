//! Critical path calculation using forward and backward passes over a
//! Kahn-style topological order.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::FxHashMap;

use crate::config::AnalysisConfig;
use crate::graph::{CpmGraph, TaskGraph};
use crate::models::{Activity, Span, TaskId};
use crate::{log_changes, log_checks, log_debug};

use super::extraction::{critical_chains, greedy_critical_path};
use super::types::{CpmResult, ScheduleError, Timing};

/// Task graph flattened to dense indices.
///
/// Index order is ascending task id, so every scan over indices is
/// deterministic. Predecessor lists are derived from successor lists, which
/// keeps in-degree bookkeeping consistent even for hand-built graphs.
pub(crate) struct Topology {
    pub ids: Vec<TaskId>,
    pub predecessors: Vec<Vec<usize>>,
    pub successors: Vec<Vec<usize>>,
}

impl Topology {
    pub fn new<A: Activity>(graph: &TaskGraph<A>) -> Self {
        let ids: Vec<TaskId> = graph.ids().collect();
        let position: FxHashMap<TaskId, usize> =
            FxHashMap::from_iter(ids.iter().enumerate().map(|(idx, &id)| (id, idx)));

        let successors: Vec<Vec<usize>> = graph
            .iter()
            .map(|task| {
                task.successors()
                    .iter()
                    .filter_map(|id| position.get(id).copied())
                    .collect()
            })
            .collect();

        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for (idx, succs) in successors.iter().enumerate() {
            for &succ in succs {
                predecessors[succ].push(idx);
            }
        }

        Self {
            ids,
            predecessors,
            successors,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_sink(&self, idx: usize) -> bool {
        self.successors[idx].is_empty()
    }

    /// Ids of the tasks not marked in `visited`, ascending.
    pub fn unvisited(&self, visited: &[bool]) -> Vec<TaskId> {
        self.ids
            .iter()
            .zip(visited)
            .filter(|(_, &seen)| !seen)
            .map(|(&id, _)| id)
            .collect()
    }
}

/// Durations of every task, in topology index order.
pub(crate) fn durations<A: Activity>(graph: &TaskGraph<A>) -> Vec<A::Span> {
    graph.iter().map(Activity::duration).collect()
}

/// Output of a forward/backward pass, indexed like the topology.
pub(crate) struct PassResult<S> {
    pub timings: Vec<Timing<S>>,
    pub total: S,
}

impl<S: Span> PassResult<S> {
    pub fn schedule(&self, topology: &Topology) -> BTreeMap<TaskId, Timing<S>> {
        topology
            .ids
            .iter()
            .copied()
            .zip(self.timings.iter().copied())
            .collect()
    }
}

/// Forward and backward pass in topological order.
///
/// Roots start at zero and seed a FIFO frontier. Each dequeued task fixes its
/// early finish and pushes it to its successors, which join the frontier once
/// all their predecessors are done. The backward pass walks the same order in
/// reverse: sinks finish at the project total, every other task at the
/// earliest late start of its successors.
///
/// Returns `CircularDependency` if the frontier empties before every task has
/// been placed.
pub(crate) fn topological_pass<S: Span>(
    topology: &Topology,
    durations: &[S],
    verbosity: u8,
) -> Result<PassResult<S>, ScheduleError> {
    let n = topology.len();
    let mut timings: Vec<Timing<S>> = vec![Timing::default(); n];
    let mut in_degree: Vec<usize> = topology.predecessors.iter().map(Vec::len).collect();

    let mut queue: VecDeque<usize> = VecDeque::with_capacity(n);
    for idx in 0..n {
        if in_degree[idx] == 0 {
            timings[idx].earliest_finish = durations[idx];
            queue.push_back(idx);
        }
    }

    // Forward pass
    let mut order: Vec<usize> = Vec::with_capacity(n);
    while let Some(idx) = queue.pop_front() {
        order.push(idx);
        let finish = timings[idx].earliest_start + durations[idx];
        timings[idx].earliest_finish = finish;

        for &succ in &topology.successors[idx] {
            let timing = &mut timings[succ];
            timing.earliest_start = timing.earliest_start.later(finish);
            log_debug!(
                verbosity,
                "  {} -> {}: ES({}) = {}",
                topology.ids[idx],
                topology.ids[succ],
                topology.ids[succ],
                timing.earliest_start
            );

            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                queue.push_back(succ);
            }
        }
    }

    if order.len() != n {
        let mut visited = vec![false; n];
        for &idx in &order {
            visited[idx] = true;
        }
        let unvisited = topology.unvisited(&visited);
        log_changes!(
            verbosity,
            "Topological pass stopped after {} of {} tasks; unvisited: {:?}",
            order.len(),
            n,
            unvisited
        );
        return Err(ScheduleError::CircularDependency { unvisited });
    }

    let total = (0..n)
        .filter(|&idx| topology.is_sink(idx))
        .map(|idx| timings[idx].earliest_finish)
        .fold(S::ZERO, S::later);

    // Backward pass
    for &idx in order.iter().rev() {
        let latest_finish = topology.successors[idx]
            .iter()
            .map(|&succ| timings[succ].latest_start)
            .reduce(S::earlier)
            .unwrap_or(total);

        let timing = &mut timings[idx];
        timing.latest_finish = latest_finish;
        timing.latest_start = latest_finish - durations[idx];
        timing.slack = latest_finish - timing.earliest_finish;

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

/// Assemble a CPM result from a finished pass.
pub(crate) fn build_cpm_result(
    topology: &Topology,
    pass: &PassResult<i64>,
    config: &AnalysisConfig,
) -> CpmResult {
    CpmResult {
        total_duration: pass.total,
        critical_path: greedy_critical_path(topology, &pass.timings, config.slack_tolerance),
        critical_paths: critical_chains(
            topology,
            &pass.timings,
            config.slack_tolerance,
            config.max_critical_paths,
        ),
        schedule: pass.schedule(topology),
    }
}

/// Analyze a fixed-duration task graph with the topological engine.
///
/// An empty graph yields a zero-duration result with an empty critical path.
///
/// # Errors
/// * `ScheduleError::CircularDependency` if the graph has a cycle
pub fn analyze_topological(graph: &CpmGraph) -> Result<CpmResult, ScheduleError> {
    analyze_topological_with_config(graph, &AnalysisConfig::default())
}

/// [`analyze_topological`] with explicit configuration.
pub fn analyze_topological_with_config(
    graph: &CpmGraph,
    config: &AnalysisConfig,
) -> Result<CpmResult, ScheduleError> {
    if graph.is_empty() {
        return Ok(CpmResult::default());
    }

    let topology = Topology::new(graph);
    let pass = topological_pass(&topology, &durations(graph), config.verbosity)?;
    let result = build_cpm_result(&topology, &pass, config);

    log_changes!(
        config.verbosity,
        "Topological CPM: {} tasks, total duration {}, critical path {:?}",
        graph.len(),
        result.total_duration,
        result.critical_path
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn chain() -> CpmGraph {
        CpmGraph::from_tasks([
            Task::new(1, 2),
            Task::new(2, 3).with_predecessors([1]),
            Task::new(3, 4).with_predecessors([2]),
        ])
        .unwrap()
    }

    fn diamond() -> CpmGraph {
        CpmGraph::from_tasks([
            Task::new(1, 1),
            Task::new(2, 5).with_predecessors([1]),
            Task::new(3, 2).with_predecessors([1]),
            Task::new(4, 1).with_predecessors([2, 3]),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let result = analyze_topological(&CpmGraph::new()).unwrap();
        assert_eq!(result.total_duration, 0);
        assert!(result.critical_path.is_empty());
        assert!(result.critical_paths.is_empty());
        assert!(result.schedule.is_empty());
    }

    #[test]
    fn test_single_task() {
        let graph = CpmGraph::from_tasks([Task::new(7, 5)]).unwrap();
        let result = analyze_topological(&graph).unwrap();

        assert_eq!(result.total_duration, 5);
        assert_eq!(result.critical_path, vec![7]);
        let timing = result.timing(7).unwrap();
        assert_eq!((timing.earliest_start, timing.latest_finish), (0, 5));
    }

    #[test]
    fn test_chain_critical_path() {
        let result = analyze_topological(&chain()).unwrap();

        assert_eq!(result.total_duration, 9);
        assert_eq!(result.critical_path, vec![1, 2, 3]);
        assert_eq!(result.critical_paths, vec![vec![1, 2, 3]]);
        for id in 1..=3 {
            assert_eq!(result.timing(id).unwrap().slack, 0);
        }
        assert_eq!(
            result.timing(1).unwrap().earliest_finish,
            result.timing(2).unwrap().earliest_start
        );
        assert_eq!(
            result.timing(2).unwrap().earliest_finish,
            result.timing(3).unwrap().earliest_start
        );
    }

    #[test]
    fn test_diamond_dependency() {
        let result = analyze_topological(&diamond()).unwrap();

        let b = result.timing(2).unwrap();
        assert_eq!((b.earliest_start, b.earliest_finish), (1, 6));
        let c = result.timing(3).unwrap();
        assert_eq!((c.earliest_start, c.earliest_finish), (1, 3));
        assert_eq!(c.slack, 3);
        assert_eq!((c.latest_start, c.latest_finish), (4, 6));
        let d = result.timing(4).unwrap();
        assert_eq!((d.earliest_start, d.earliest_finish), (6, 7));

        assert_eq!(result.total_duration, 7);
        assert_eq!(result.critical_path, vec![1, 2, 4]);
        assert_eq!(result.critical_tasks(), vec![1, 2, 4]);
    }

    #[test]
    fn test_parallel_paths_with_slack() {
        // 1 (2) -> 3 (1)
        // 2 (5) -> 3 (1)
        let graph = CpmGraph::from_tasks([
            Task::new(1, 2),
            Task::new(2, 5),
            Task::new(3, 1).with_predecessors([1, 2]),
        ])
        .unwrap();
        let result = analyze_topological(&graph).unwrap();

        assert_eq!(result.total_duration, 6);
        assert_eq!(result.timing(1).unwrap().slack, 3);
        assert_eq!(result.critical_path, vec![2, 3]);
    }

    #[test]
    fn test_disconnected_components_share_total() {
        // 1 -> 2 (total 4) and an isolated 3 (duration 1)
        let graph = CpmGraph::from_tasks([
            Task::new(1, 2),
            Task::new(2, 2).with_predecessors([1]),
            Task::new(3, 1),
        ])
        .unwrap();
        let result = analyze_topological(&graph).unwrap();

        assert_eq!(result.total_duration, 4);
        let isolated = result.timing(3).unwrap();
        assert_eq!(isolated.latest_finish, 4);
        assert_eq!(isolated.slack, 3);
    }

    #[test]
    fn test_repeated_analysis_is_identical() {
        let graph = diamond();
        let first = analyze_topological(&graph).unwrap();
        let second = analyze_topological(&graph).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_circular_dependency_error() {
        // 1 -> 2 -> 3 -> 2
        let mut graph = CpmGraph::new();
        for id in 1..=3 {
            graph.insert(Task::new(id, 1)).unwrap();
        }
        graph.add_dependency(1, 2).unwrap();
        graph.add_dependency(2, 3).unwrap();
        graph.add_dependency(3, 2).unwrap();

        let result = analyze_topological(&graph);
        assert_eq!(
            result,
            Err(ScheduleError::CircularDependency {
                unvisited: vec![2, 3]
            })
        );
    }

    #[test]
    fn test_verbose_analysis_matches_silent() {
        let config = AnalysisConfig {
            verbosity: crate::logging::VERBOSITY_DEBUG,
            ..AnalysisConfig::default()
        };
        let verbose = analyze_topological_with_config(&diamond(), &config).unwrap();
        assert_eq!(verbose, analyze_topological(&diamond()).unwrap());
    }
}
