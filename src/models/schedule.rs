//! Schedule (timeline) model.
//!
//! A schedule is the concrete timeline derived from a [`Solution`]: every
//! task with its worker, start, and end. It may carry the constraint
//! violations found while building it.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3
//!
//! [`Solution`]: super::Solution

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A timeline of scheduled tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Scheduled tasks, in the order they were placed.
    pub entries: Vec<ScheduledTask>,
    /// Constraint violations detected in this schedule.
    pub violations: Vec<Violation>,
}

/// A task placed on a worker's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Task ID.
    pub task_id: String,
    /// Worker ID.
    pub worker_id: String,
    /// Start time.
    pub start: f64,
    /// End time.
    pub end: f64,
}

/// A constraint violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (task or worker).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A task has no assignment, or more than one.
    MissingTask,
    /// An assignment names a task or worker that doesn't exist.
    UnknownReference,
    /// A task was placed before one of its dependencies.
    DependencyViolation,
    /// Two tasks overlap on the same worker.
    WorkerOverlap,
    /// The worker lacks a required skill level.
    SkillMismatch,
}

impl ScheduledTask {
    /// Creates a new entry.
    pub fn new(
        task_id: impl Into<String>,
        worker_id: impl Into<String>,
        start: f64,
        end: f64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            worker_id: worker_id.into(),
            start,
            end,
        }
    }

    /// Duration (end - start).
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl Violation {
    /// Creates a missing-task violation.
    pub fn missing_task(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::MissingTask,
            entity_id: task_id.into(),
            message: message.into(),
            severity: 100,
        }
    }

    /// Creates an unknown-reference violation.
    pub fn unknown_reference(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::UnknownReference,
            entity_id: entity_id.into(),
            message: message.into(),
            severity: 100,
        }
    }

    /// Creates a dependency violation.
    pub fn dependency_violation(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::DependencyViolation,
            entity_id: task_id.into(),
            message: message.into(),
            severity: 95,
        }
    }

    /// Creates a worker overlap violation.
    pub fn worker_overlap(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::WorkerOverlap,
            entity_id: worker_id.into(),
            message: message.into(),
            severity: 90,
        }
    }

    /// Creates a skill mismatch violation.
    pub fn skill_mismatch(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::SkillMismatch,
            entity_id: task_id.into(),
            message: message.into(),
            severity: 50,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: ScheduledTask) {
        self.entries.push(entry);
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether the schedule has no violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations of one type.
    pub fn violation_count(&self, violation_type: &ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| &v.violation_type == violation_type)
            .count()
    }

    /// Makespan: latest end minus earliest start (0 when empty).
    pub fn makespan(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let first = self.entries.iter().map(|e| e.start).fold(f64::INFINITY, f64::min);
        let last = self
            .entries
            .iter()
            .map(|e| e.end)
            .fold(f64::NEG_INFINITY, f64::max);
        last - first
    }

    /// Finds the entry for a task.
    pub fn entry_for_task(&self, task_id: &str) -> Option<&ScheduledTask> {
        self.entries.iter().find(|e| e.task_id == task_id)
    }

    /// A worker's entries sorted by start time.
    pub fn timeline(&self, worker_id: &str) -> Vec<&ScheduledTask> {
        let mut entries: Vec<&ScheduledTask> = self
            .entries
            .iter()
            .filter(|e| e.worker_id == worker_id)
            .collect();
        entries.sort_by(|a, b| a.start.total_cmp(&b.start));
        entries
    }

    /// Busy time per worker that has at least one entry.
    pub fn workloads(&self) -> BTreeMap<String, f64> {
        let mut busy: BTreeMap<String, f64> = BTreeMap::new();
        for e in &self.entries {
            *busy.entry(e.worker_id.clone()).or_insert(0.0) += e.duration();
        }
        busy
    }

    /// Worker utilization: busy time / horizon.
    ///
    /// Returns `None` if `horizon` is not positive.
    pub fn worker_utilization(&self, worker_id: &str, horizon: f64) -> Option<f64> {
        if horizon <= 0.0 {
            return None;
        }
        let busy: f64 = self
            .entries
            .iter()
            .filter(|e| e.worker_id == worker_id)
            .map(ScheduledTask::duration)
            .sum();
        Some(busy / horizon)
    }

    /// Completion time of a task.
    pub fn task_completion_time(&self, task_id: &str) -> Option<f64> {
        self.entry_for_task(task_id).map(|e| e.end)
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
