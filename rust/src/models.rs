//! Core data types for task networks.

use std::fmt;
use std::ops::{Add, Sub};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Task identifier (unique positive integer).
pub type TaskId = u32;

/// Absolute tolerance used when comparing floating-point slack against zero.
pub const DEFAULT_SLACK_TOLERANCE: f64 = 1e-6;

/// Time quantity the forward/backward passes are computed in.
///
/// Implemented for `i64` (deterministic CPM) and `f64` (PERT expected durations).
pub trait Span:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Default
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
{
    const ZERO: Self;

    /// Whether this value counts as zero. Integers ignore the tolerance.
    fn is_zero(self, tolerance: f64) -> bool;

    /// The larger of two values.
    #[inline]
    fn later(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// The smaller of two values.
    #[inline]
    fn earlier(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl Span for i64 {
    const ZERO: Self = 0;

    #[inline]
    fn is_zero(self, _tolerance: f64) -> bool {
        self == 0
    }
}

impl Span for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn is_zero(self, tolerance: f64) -> bool {
        self.abs() < tolerance
    }
}

/// A node of a task network: identity, duration and precedence edges.
pub trait Activity {
    type Span: Span;

    fn id(&self) -> TaskId;

    /// Duration used by the forward/backward passes.
    fn duration(&self) -> Self::Span;

    fn predecessors(&self) -> &[TaskId];

    fn successors(&self) -> &[TaskId];

    /// Mutable edge lists, used by the graph to keep them symmetric.
    fn edges_mut(&mut self) -> (&mut Vec<TaskId>, &mut Vec<TaskId>);
}

/// A task with a fixed integer duration.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    #[cfg_attr(feature = "python", pyo3(get))]
    pub id: TaskId,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub duration: u32,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub predecessors: Vec<TaskId>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub successors: Vec<TaskId>,
}

impl Task {
    pub fn new(id: TaskId, duration: u32) -> Self {
        Self {
            id,
            duration,
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    /// Declare the tasks that must finish before this one starts.
    ///
    /// Only meaningful when the graph is built with [`crate::TaskGraph::from_tasks`],
    /// which derives successor lists from these.
    pub fn with_predecessors(mut self, predecessors: impl IntoIterator<Item = TaskId>) -> Self {
        self.predecessors = predecessors.into_iter().collect();
        self
    }
}

impl Activity for Task {
    type Span = i64;

    fn id(&self) -> TaskId {
        self.id
    }

    fn duration(&self) -> i64 {
        i64::from(self.duration)
    }

    fn predecessors(&self) -> &[TaskId] {
        &self.predecessors
    }

    fn successors(&self) -> &[TaskId] {
        &self.successors
    }

    fn edges_mut(&mut self) -> (&mut Vec<TaskId>, &mut Vec<TaskId>) {
        (&mut self.predecessors, &mut self.successors)
    }
}

/// A task with a three-point (optimistic / most likely / pessimistic) estimate.
///
/// Expected duration and variance are derived once at construction. The
/// estimates are nominally ordered `optimistic <= most_likely <= pessimistic`;
/// that ordering is not checked.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, PartialEq)]
pub struct PertTask {
    #[cfg_attr(feature = "python", pyo3(get))]
    pub id: TaskId,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub optimistic: u32,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub most_likely: u32,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub pessimistic: u32,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub predecessors: Vec<TaskId>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub successors: Vec<TaskId>,
    expected_duration: f64,
    variance: f64,
}

impl PertTask {
    pub fn new(id: TaskId, optimistic: u32, most_likely: u32, pessimistic: u32) -> Self {
        let (o, m, p) = (
            f64::from(optimistic),
            f64::from(most_likely),
            f64::from(pessimistic),
        );
        Self {
            id,
            optimistic,
            most_likely,
            pessimistic,
            predecessors: Vec::new(),
            successors: Vec::new(),
            expected_duration: (o + 4.0 * m + p) / 6.0,
            variance: ((p - o) / 6.0).powi(2),
        }
    }

    /// See [`Task::with_predecessors`].
    pub fn with_predecessors(mut self, predecessors: impl IntoIterator<Item = TaskId>) -> Self {
        self.predecessors = predecessors.into_iter().collect();
        self
    }

    /// `(optimistic + 4 * most_likely + pessimistic) / 6`
    pub fn expected_duration(&self) -> f64 {
        self.expected_duration
    }

    /// `((pessimistic - optimistic) / 6)^2`
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Sampling bounds as `(low, high)`, tolerating swapped estimates.
    pub fn range(&self) -> (u32, u32) {
        if self.optimistic <= self.pessimistic {
            (self.optimistic, self.pessimistic)
        } else {
            (self.pessimistic, self.optimistic)
        }
    }
}

impl Activity for PertTask {
    type Span = f64;

    fn id(&self) -> TaskId {
        self.id
    }

    fn duration(&self) -> f64 {
        self.expected_duration
    }

    fn predecessors(&self) -> &[TaskId] {
        &self.predecessors
    }

    fn successors(&self) -> &[TaskId] {
        &self.successors
    }

    fn edges_mut(&mut self) -> (&mut Vec<TaskId>, &mut Vec<TaskId>) {
        (&mut self.predecessors, &mut self.successors)
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (id, duration, predecessors=None))]
    fn py_new(id: TaskId, duration: u32, predecessors: Option<Vec<TaskId>>) -> Self {
        Self::new(id, duration).with_predecessors(predecessors.unwrap_or_default())
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={}, duration={}, predecessors={:?})",
            self.id, self.duration, self.predecessors
        )
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl PertTask {
    #[new]
    #[pyo3(signature = (id, optimistic, most_likely, pessimistic, predecessors=None))]
    fn py_new(
        id: TaskId,
        optimistic: u32,
        most_likely: u32,
        pessimistic: u32,
        predecessors: Option<Vec<TaskId>>,
    ) -> Self {
        Self::new(id, optimistic, most_likely, pessimistic)
            .with_predecessors(predecessors.unwrap_or_default())
    }

    #[getter(expected_duration)]
    fn py_expected_duration(&self) -> f64 {
        self.expected_duration
    }

    #[getter(variance)]
    fn py_variance(&self) -> f64 {
        self.variance
    }

    fn __repr__(&self) -> String {
        format!(
            "PertTask(id={}, estimates=({}, {}, {}), predecessors={:?})",
            self.id, self.optimistic, self.most_likely, self.pessimistic, self.predecessors
        )
    }
}
