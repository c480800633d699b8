//! Solution (chromosome) model.
//!
//! A solution is an ordered list of `(task, worker, start)` genes. Order has
//! no meaning for fitness, but it fixes the locus of each gene: crossover
//! and mutation act on positions, not on task identity.
//!
//! Solutions are plain values. Cloning produces an independent copy, so
//! migrants, cache keys and offspring never alias one another.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// One gene: a task assigned to a worker at a start time.
///
/// The start time is not required to respect dependencies or worker
/// availability; violations are priced by the fitness function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned task ID.
    pub task_id: String,
    /// Assigned worker ID.
    pub worker_id: String,
    /// Start time (non-negative).
    pub start: f64,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(task_id: impl Into<String>, worker_id: impl Into<String>, start: f64) -> Self {
        Self {
            task_id: task_id.into(),
            worker_id: worker_id.into(),
            start,
        }
    }

    /// Bit pattern of the start time with `-0.0` folded into `0.0`.
    #[inline]
    fn start_bits(&self) -> u64 {
        (self.start + 0.0).to_bits()
    }
}

// Exact (bitwise) comparison keeps Eq and Hash consistent for cache keys.
impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.task_id == other.task_id
            && self.worker_id == other.worker_id
            && self.start_bits() == other.start_bits()
    }
}

impl Eq for Assignment {}

impl Hash for Assignment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.task_id.hash(state);
        self.worker_id.hash(state);
        self.start_bits().hash(state);
    }
}

/// A complete candidate schedule: one assignment per task, by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution {
    /// Genes in locus order.
    pub assignments: Vec<Assignment>,
}

impl Solution {
    /// Creates a solution from genes.
    pub fn new(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    /// Number of genes.
    #[inline]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the solution has no genes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterates genes in locus order.
    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.assignments.iter()
    }

    /// Finds the assignment for a task.
    pub fn assignment_for(&self, task_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.task_id == task_id)
    }

    /// Worker assigned to a task.
    pub fn worker_for(&self, task_id: &str) -> Option<&str> {
        self.assignment_for(task_id).map(|a| a.worker_id.as_str())
    }

    /// All assignments given to a worker, in locus order.
    pub fn assignments_for_worker<'a>(
        &'a self,
        worker_id: &'a str,
    ) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments.iter().filter(move |a| a.worker_id == worker_id)
    }
}

impl FromIterator<Assignment> for Solution {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Solution {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.iter()
    }
}
