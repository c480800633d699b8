//! Problem instance.
//!
//! Bundles the task and worker tables of one run with the lookups every
//! operator needs: ID → index maps, dependency index lists, total work,
//! a topological task order, and per-task qualified workers. Built once,
//! validated once, then shared read-only between islands.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Task, Worker};
use crate::error::ConfigError;
use crate::validation::{
    topological_order, validate_input, ValidationError, ValidationErrorKind,
};

/// Plain task and worker tables, as supplied by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemData {
    /// Tasks to schedule.
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Available workers.
    #[serde(default)]
    pub workers: Vec<Worker>,
}

/// A validated, immutable scheduling problem.
///
/// # Invariants
/// - Task and worker IDs are unique.
/// - Every dependency refers to a task in the table.
/// - The dependency graph is acyclic.
/// - Durations are positive and finite.
///
/// # Example
/// ```
/// use u_skillsched::models::{Problem, Task, Worker};
///
/// let problem = Problem::new(
///     vec![Task::new("T1", 2.0), Task::new("T2", 3.0).with_dependency("T1")],
///     vec![Worker::new("W1")],
/// ).unwrap();
/// assert_eq!(problem.task_count(), 2);
/// assert!((problem.total_duration() - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ProblemData", into = "ProblemData")]
pub struct Problem {
    tasks: Vec<Task>,
    workers: Vec<Worker>,
    task_index: HashMap<String, usize>,
    worker_index: HashMap<String, usize>,
    dependencies: Vec<Vec<usize>>,
    qualified: Vec<Vec<usize>>,
    order: Vec<usize>,
    total_duration: f64,
}

impl Problem {
    /// Validates the tables and builds the problem.
    ///
    /// # Errors
    /// [`ConfigError::InvalidProblem`] with every detected issue.
    pub fn new(tasks: Vec<Task>, workers: Vec<Worker>) -> Result<Self, ConfigError> {
        validate_input(&tasks, &workers).map_err(ConfigError::InvalidProblem)?;

        let task_index: HashMap<String, usize> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let worker_index: HashMap<String, usize> = workers
            .iter()
            .enumerate()
            .map(|(i, w)| (w.id.clone(), i))
            .collect();

        // References were checked by validate_input.
        let dependencies: Vec<Vec<usize>> = tasks
            .iter()
            .map(|t| {
                t.dependencies
                    .iter()
                    .filter_map(|d| task_index.get(d).copied())
                    .collect()
            })
            .collect();

        let order = topological_order(&dependencies).map_err(|node| {
            ConfigError::InvalidProblem(vec![ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving task '{}'", tasks[node].id),
            )])
        })?;

        let qualified = tasks
            .iter()
            .map(|t| {
                workers
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| w.covers(t))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        let total_duration = tasks.iter().map(|t| t.duration).sum();

        Ok(Self {
            tasks,
            workers,
            task_index,
            worker_index,
            dependencies,
            qualified,
            order,
            total_duration,
        })
    }

    /// Builds the problem from plain tables.
    pub fn from_data(data: ProblemData) -> Result<Self, ConfigError> {
        Self::new(data.tasks, data.workers)
    }

    /// All tasks, in table order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// All workers, in table order.
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Task at a table index.
    pub fn task(&self, idx: usize) -> &Task {
        &self.tasks[idx]
    }

    /// Worker at a table index.
    pub fn worker(&self, idx: usize) -> &Worker {
        &self.workers[idx]
    }

    /// Table index of a task ID.
    pub fn task_index(&self, task_id: &str) -> Option<usize> {
        self.task_index.get(task_id).copied()
    }

    /// Table index of a worker ID.
    pub fn worker_index(&self, worker_id: &str) -> Option<usize> {
        self.worker_index.get(worker_id).copied()
    }

    /// Looks up a task by ID.
    pub fn task_by_id(&self, task_id: &str) -> Option<&Task> {
        self.task_index(task_id).map(|i| &self.tasks[i])
    }

    /// Looks up a worker by ID.
    pub fn worker_by_id(&self, worker_id: &str) -> Option<&Worker> {
        self.worker_index(worker_id).map(|i| &self.workers[i])
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Sum of all task durations.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Indices of the tasks a task depends on.
    pub fn dependencies(&self, task_idx: usize) -> &[usize] {
        &self.dependencies[task_idx]
    }

    /// Indices of the workers whose skill map names every skill the task requires.
    pub fn qualified_workers(&self, task_idx: usize) -> &[usize] {
        &self.qualified[task_idx]
    }

    /// Task indices in dependency-respecting order (dependencies first).
    pub fn topological_order(&self) -> &[usize] {
        &self.order
    }
}

impl TryFrom<ProblemData> for Problem {
    type Error = ConfigError;

    fn try_from(data: ProblemData) -> Result<Self, Self::Error> {
        Self::from_data(data)
    }
}

impl From<Problem> for ProblemData {
    fn from(problem: Problem) -> Self {
        Self {
            tasks: problem.tasks,
            workers: problem.workers,
        }
    }
}
