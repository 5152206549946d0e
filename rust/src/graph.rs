//! Task network container.
//!
//! Tasks are kept in identifier-ascending order so every pass that scans the
//! graph (tie-breaking, sink scans, relaxation rounds) is reproducible.

use std::collections::btree_map::{self, BTreeMap};

use thiserror::Error;

use crate::models::{Activity, PertTask, Task, TaskId};

/// Errors raised while assembling a task graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate task id: {0}")]
    DuplicateTask(TaskId),
    #[error("Unknown task id: {0}")]
    UnknownTask(TaskId),
    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),
}

/// Mapping from task id to task record, with symmetric precedence edges.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskGraph<A> {
    tasks: BTreeMap<TaskId, A>,
}

/// Graph of fixed-duration tasks.
pub type CpmGraph = TaskGraph<Task>;

/// Graph of three-point estimated tasks.
pub type PertGraph = TaskGraph<PertTask>;

impl<A> Default for TaskGraph<A> {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
        }
    }
}

impl<A: Activity> TaskGraph<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from tasks whose predecessor lists are authoritative.
    ///
    /// Successor lists are rebuilt from the predecessor lists; duplicate
    /// predecessor entries are collapsed.
    pub fn from_tasks(tasks: impl IntoIterator<Item = A>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        let mut edges: Vec<(TaskId, TaskId)> = Vec::new();

        for mut task in tasks {
            let id = task.id();
            let (predecessors, successors) = task.edges_mut();
            edges.extend(predecessors.drain(..).map(|before| (before, id)));
            successors.clear();
            graph.insert(task)?;
        }

        for (before, after) in edges {
            graph.add_dependency(before, after)?;
        }
        Ok(graph)
    }

    /// Add a task. Its edge lists are taken as-is.
    pub fn insert(&mut self, task: A) -> Result<(), GraphError> {
        match self.tasks.entry(task.id()) {
            btree_map::Entry::Occupied(_) => Err(GraphError::DuplicateTask(task.id())),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(task);
                Ok(())
            }
        }
    }

    /// Record that `before` must finish before `after` starts.
    ///
    /// Adding an existing edge is a no-op.
    pub fn add_dependency(&mut self, before: TaskId, after: TaskId) -> Result<(), GraphError> {
        if before == after {
            return Err(GraphError::SelfDependency(before));
        }
        if !self.tasks.contains_key(&after) {
            return Err(GraphError::UnknownTask(after));
        }
        let Some(predecessor) = self.tasks.get_mut(&before) else {
            return Err(GraphError::UnknownTask(before));
        };

        let (_, successors) = predecessor.edges_mut();
        if successors.contains(&after) {
            return Ok(());
        }
        successors.push(after);

        if let Some(successor) = self.tasks.get_mut(&after) {
            let (predecessors, _) = successor.edges_mut();
            predecessors.push(before);
        }
        Ok(())
    }

    pub fn get(&self, id: TaskId) -> Option<&A> {
        self.tasks.get(&id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.keys().copied()
    }

    /// Tasks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &A> + '_ {
        self.tasks.values()
    }

    /// Tasks with no predecessors.
    pub fn roots(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.iter()
            .filter(|task| task.predecessors().is_empty())
            .map(Activity::id)
    }

    /// Tasks with no successors.
    pub fn sinks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.iter()
            .filter(|task| task.successors().is_empty())
            .map(Activity::id)
    }
}

impl PertGraph {
    /// Build a fixed-duration graph with the same topology, choosing each
    /// task's duration with `duration_of`.
    ///
    /// Useful for scenario analysis (all most-likely, all pessimistic, ...).
    /// [`crate::simulate`] does not go through here; it feeds sampled
    /// durations straight into a shared index topology.
    pub fn to_deterministic(&self, mut duration_of: impl FnMut(&PertTask) -> u32) -> CpmGraph {
        let tasks = self
            .tasks
            .iter()
            .map(|(&id, task)| {
                let deterministic = Task {
                    id,
                    duration: duration_of(task),
                    predecessors: task.predecessors.clone(),
                    successors: task.successors.clone(),
                };
                (id, deterministic)
            })
            .collect();
        TaskGraph { tasks }
    }
}
