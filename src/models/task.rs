//! Task model.
//!
//! A task is a unit of work with a duration, the set of tasks that must
//! complete before it may start, and the skill levels it demands.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A task to be scheduled.
///
/// # Time Representation
/// Durations and start times are real-valued and unit-free. The consumer
/// decides whether they are hours, days, or sprints; the optimizer only
/// compares them with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Processing duration (positive).
    pub duration: f64,
    /// IDs of tasks that must complete before this one starts.
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    /// Required skill levels (skill name → minimum level).
    #[serde(default)]
    pub skill_requirements: BTreeMap<String, f64>,
}

impl Task {
    /// Creates a new task with the given ID and duration.
    pub fn new(id: impl Into<String>, duration: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            duration,
            dependencies: BTreeSet::new(),
            skill_requirements: BTreeMap::new(),
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a dependency on another task.
    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        self.dependencies.insert(task_id.into());
        self
    }

    /// Adds a skill requirement.
    pub fn with_requirement(mut self, skill: impl Into<String>, level: f64) -> Self {
        self.skill_requirements.insert(skill.into(), level);
        self
    }

    /// Whether this task waits on any other task.
    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    /// Required level for a skill, if the task requires it.
    pub fn required_level(&self, skill: &str) -> Option<f64> {
        self.skill_requirements.get(skill).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder() {
        let task = Task::new("T1", 2.5)
            .with_name("Write parser")
            .with_dependency("T0")
            .with_dependency("T0")
            .with_requirement("rust", 3.0);

        assert_eq!(task.id, "T1");
        assert_eq!(task.name, "Write parser");
        assert!((task.duration - 2.5).abs() < 1e-10);
        assert_eq!(task.dependencies.len(), 1);
        assert!(task.has_dependencies());
        assert_eq!(task.required_level("rust"), Some(3.0));
        assert_eq!(task.required_level("design"), None);
    }

    #[test]
    fn test_task_deserialize_defaults() {
        let task: Task = serde_json::from_str(r#"{"id": "T9", "duration": 4.0}"#).unwrap();
        assert_eq!(task.id, "T9");
        assert!(task.name.is_empty());
        assert!(!task.has_dependencies());
        assert!(task.skill_requirements.is_empty());
    }
}
