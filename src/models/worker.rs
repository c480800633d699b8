//! Worker model.
//!
//! Workers perform tasks. Each carries a map of skill levels; a skill
//! missing from the map counts as level 0.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1.2

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Task;

/// A worker that can be assigned to tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique worker identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Skill levels (skill name → level).
    #[serde(default)]
    pub skills: BTreeMap<String, f64>,
}

impl Worker {
    /// Creates a worker with no skills.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills: BTreeMap::new(),
        }
    }

    /// Sets the worker name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds or replaces a skill level.
    pub fn with_skill(mut self, name: impl Into<String>, level: f64) -> Self {
        self.skills.insert(name.into(), level);
        self
    }

    /// Whether the skill appears in this worker's map (at any level).
    pub fn has_skill(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    /// Returns the level for a skill (0.0 if not found).
    pub fn skill_level(&self, name: &str) -> f64 {
        self.skills.get(name).copied().unwrap_or(0.0)
    }

    /// Whether every skill the task requires appears in this worker's map.
    ///
    /// Only presence is checked, not level; shortfalls are left to the
    /// skill penalty.
    pub fn covers(&self, task: &Task) -> bool {
        task.skill_requirements.keys().all(|s| self.has_skill(s))
    }

    /// Heuristic fit of this worker for a task.
    ///
    /// `+1` for each requirement met, `-(required - actual)` for each
    /// requirement missed. A task with no requirements scores 0 for everyone.
    pub fn skill_match(&self, task: &Task) -> f64 {
        task.skill_requirements
            .iter()
            .map(|(skill, &required)| {
                let actual = self.skill_level(skill);
                if actual >= required {
                    1.0
                } else {
                    -(required - actual)
                }
            })
            .sum()
    }

    /// Total shortfall against a task's requirements (0 when fully qualified).
    pub fn skill_shortfall(&self, task: &Task) -> f64 {
        task.skill_requirements
            .iter()
            .map(|(skill, &required)| (required - self.skill_level(skill)).max(0.0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_builder() {
        let w = Worker::new("W1")
            .with_name("Ada")
            .with_skill("rust", 4.0)
            .with_skill("design", 1.5);

        assert_eq!(w.id, "W1");
        assert_eq!(w.name, "Ada");
        assert!(w.has_skill("rust"));
        assert!(!w.has_skill("testing"));
        assert!((w.skill_level("design") - 1.5).abs() < 1e-10);
        assert!((w.skill_level("unknown") - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_skill_match() {
        let task = Task::new("T1", 1.0)
            .with_requirement("rust", 3.0)
            .with_requirement("design", 2.0);
        let w = Worker::new("W1")
            .with_skill("rust", 4.0)
            .with_skill("design", 0.5);

        // rust met (+1), design short by 1.5
        assert!((w.skill_match(&task) - (-0.5)).abs() < 1e-10);
        assert!((w.skill_shortfall(&task) - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_skill_match_no_requirements() {
        let task = Task::new("T1", 1.0);
        assert!((Worker::new("W1").skill_match(&task) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_covers_checks_presence_only() {
        let task = Task::new("T1", 1.0).with_requirement("rust", 5.0);
        assert!(Worker::new("W1").with_skill("rust", 0.1).covers(&task));
        assert!(!Worker::new("W2").covers(&task));
        assert!(Worker::new("W3").covers(&Task::new("T2", 1.0)));
    }
}
