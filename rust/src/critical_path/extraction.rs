//! Critical path extraction from a computed schedule.

use std::cmp::Ordering;

use crate::models::{Span, TaskId};

use super::calculation::Topology;
use super::types::Timing;

/// Compare span values for sorting, treating incomparable values as equal.
fn cmp_span<S: Span>(a: S, b: S) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Build one critical chain greedily.
///
/// Zero-slack tasks are sorted by early start (stable, so ties keep ascending
/// id order). The first becomes the head; each later candidate is appended only
/// if it is a direct successor of the current tail, otherwise it is dropped.
/// Parallel critical branches therefore lose all but the first-reached branch;
/// [`critical_chains`] reports every branch.
pub(crate) fn greedy_critical_path<S: Span>(
    topology: &Topology,
    timings: &[Timing<S>],
    tolerance: f64,
) -> Vec<TaskId> {
    let mut candidates: Vec<usize> = (0..timings.len())
        .filter(|&idx| timings[idx].is_critical_within(tolerance))
        .collect();
    candidates.sort_by(|&a, &b| cmp_span(timings[a].earliest_start, timings[b].earliest_start));

    let mut path: Vec<usize> = Vec::with_capacity(candidates.len());
    for idx in candidates {
        match path.last() {
            None => path.push(idx),
            Some(&tail) if topology.successors[tail].contains(&idx) => path.push(idx),
            Some(_) => {}
        }
    }

    path.into_iter().map(|idx| topology.ids[idx]).collect()
}

/// Enumerate the maximal chains of the zero-slack subgraph.
///
/// An edge `u -> v` belongs to the subgraph when both ends are critical and
/// `EF(u) == ES(v)`. Chains run from a critical task with no such incoming
/// edge to one with no such outgoing edge, are emitted in lexicographic id
/// order, and stop after `limit` chains.
pub(crate) fn critical_chains<S: Span>(
    topology: &Topology,
    timings: &[Timing<S>],
    tolerance: f64,
    limit: usize,
) -> Vec<Vec<TaskId>> {
    let n = timings.len();
    let critical: Vec<bool> = timings
        .iter()
        .map(|timing| timing.is_critical_within(tolerance))
        .collect();

    let next: Vec<Vec<usize>> = (0..n)
        .map(|idx| {
            if !critical[idx] {
                return Vec::new();
            }
            let finish = timings[idx].earliest_finish;
            let mut tight: Vec<usize> = topology.successors[idx]
                .iter()
                .copied()
                .filter(|&succ| {
                    critical[succ] && (timings[succ].earliest_start - finish).is_zero(tolerance)
                })
                .collect();
            // Index order is ascending id order
            tight.sort_unstable();
            tight.dedup();
            tight
        })
        .collect();

    let mut has_incoming = vec![false; n];
    for succ in next.iter().flatten() {
        has_incoming[*succ] = true;
    }

    let mut chains: Vec<Vec<TaskId>> = Vec::new();
    for start in (0..n).filter(|&idx| critical[idx] && !has_incoming[idx]) {
        if chains.len() >= limit {
            break;
        }
        extend_chains(&next, &topology.ids, start, &mut chains, limit);
    }
    chains
}

/// Depth-first walk from `start`, emitting every chain that reaches a task
/// with no tight successor.
///
/// Each stack frame is a task and the position of the next tight successor to
/// visit, so chain length is bounded by memory rather than call depth.
fn extend_chains(
    next: &[Vec<usize>],
    ids: &[TaskId],
    start: usize,
    chains: &mut Vec<Vec<TaskId>>,
    limit: usize,
) {
    let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
    while let Some(frame) = stack.last_mut() {
        if chains.len() >= limit {
            return;
        }
        let (tail, cursor) = *frame;
        if next[tail].is_empty() {
            chains.push(stack.iter().map(|&(idx, _)| ids[idx]).collect());
            stack.pop();
        } else if let Some(&succ) = next[tail].get(cursor) {
            frame.1 += 1;
            stack.push((succ, 0));
        } else {
            stack.pop();
        }
    }
}
