//! Input validation for scheduling problems.
//!
//! Checks structural integrity of tasks and workers before a run.
//! Detects:
//! - Duplicate IDs
//! - Dependencies on tasks that don't exist
//! - Non-positive or non-finite durations
//! - Negative or non-finite skill levels
//! - Circular dependencies (DAG validation)
//!
//! Also provides the dependency-respecting task order used by the
//! constructive initializers.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Task, Worker};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A task depends on a task that doesn't exist.
    InvalidDependency,
    /// A task duration is zero, negative, or not finite.
    InvalidDuration,
    /// A skill requirement or skill level is negative or not finite.
    InvalidSkillLevel,
    /// The dependency graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the input data for a scheduling problem.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. No duplicate worker IDs
/// 3. Every duration is positive and finite
/// 4. Every skill requirement and skill level is non-negative and finite
/// 5. All dependency references point to existing tasks
/// 6. No circular dependencies
///
/// An empty worker table is *not* a validation error: fitness reports it
/// as `+∞` and the initializer rejects it.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(tasks: &[Task], workers: &[Worker]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut worker_ids = HashSet::new();
    for w in workers {
        if !worker_ids.insert(w.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate worker ID: {}", w.id),
            ));
        }
        for (skill, &level) in &w.skills {
            if !level.is_finite() || level < 0.0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSkillLevel,
                    format!("Worker '{}' has invalid level {level} for '{skill}'", w.id),
                ));
            }
        }
    }

    let mut task_index: HashMap<&str, usize> = HashMap::new();
    for (idx, task) in tasks.iter().enumerate() {
        if task_index.insert(task.id.as_str(), idx).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }

        if !task.duration.is_finite() || task.duration <= 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Task '{}' has invalid duration {}", task.id, task.duration),
            ));
        }

        for (skill, &required) in &task.skill_requirements {
            if !required.is_finite() || required < 0.0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSkillLevel,
                    format!(
                        "Task '{}' requires invalid level {required} for '{skill}'",
                        task.id
                    ),
                ));
            }
        }
    }

    // Check dependency references
    let mut dependencies = vec![Vec::new(); tasks.len()];
    for (idx, task) in tasks.iter().enumerate() {
        for dep in &task.dependencies {
            match task_index.get(dep.as_str()) {
                Some(&dep_idx) => dependencies[idx].push(dep_idx),
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDependency,
                    format!("Task '{}' depends on unknown task '{dep}'", task.id),
                )),
            }
        }
    }

    if let Err(node) = topological_order(&dependencies) {
        errors.push(ValidationError::new(
            ValidationErrorKind::CyclicDependency,
            format!(
                "Circular dependency detected involving task '{}'",
                tasks[node].id
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Orders tasks so that every task comes after all of its dependencies.
///
/// `dependencies[i]` lists the indices of the tasks that task `i` depends
/// on. Roots are taken in table order and dependencies in list order, so
/// the result is the depth-first post-order of the dependency graph.
///
/// # Algorithm
/// Depth-first search driven by an explicit stack of `(node, cursor)`
/// frames, so deep dependency chains cannot overflow the call stack.
/// Reaching a node that is still on the stack is a back edge.
///
/// # Returns
/// The order (each index exactly once), or `Err(i)` where task `i` lies on
/// a dependency cycle.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
pub fn topological_order(dependencies: &[Vec<usize>]) -> Result<Vec<usize>, usize> {
    let n = dependencies.len();
    let mut marks = vec![Mark::Unvisited; n];
    let mut order = Vec::with_capacity(n);
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::InProgress;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if let Some(&dep) = dependencies[node].get(frame.1) {
                frame.1 += 1;
                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::InProgress;
                        stack.push((dep, 0));
                    }
                    Mark::InProgress => return Err(dep), // Back edge → cycle
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                order.push(node);
                stack.pop();
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_workers() -> Vec<Worker> {
        vec![
            Worker::new("W1").with_skill("rust", 4.0),
            Worker::new("W2").with_skill("design", 2.0),
        ]
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new("T1", 2.0).with_requirement("rust", 3.0),
            Task::new("T2", 3.0).with_dependency("T1"),
            Task::new("T3", 1.0).with_dependency("T2"),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_tasks(), &sample_workers()).is_ok());
    }

    #[test]
    fn test_no_workers_is_not_a_validation_error() {
        assert!(validate_input(&sample_tasks(), &[]).is_ok());
    }

    #[test]
    fn test_duplicate_task_id() {
        let tasks = vec![Task::new("T1", 1.0), Task::new("T1", 2.0)];
        let errors = validate_input(&tasks, &sample_workers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("task")));
    }

    #[test]
    fn test_duplicate_worker_id() {
        let workers = vec![Worker::new("W1"), Worker::new("W1")];
        let errors = validate_input(&sample_tasks(), &workers).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("worker")));
    }

    #[test]
    fn test_invalid_dependency() {
        let tasks = vec![Task::new("T1", 1.0).with_dependency("NONEXISTENT")];
        let errors = validate_input(&tasks, &sample_workers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidDependency));
    }

    #[test]
    fn test_invalid_duration() {
        let tasks = vec![
            Task::new("T1", 0.0),
            Task::new("T2", -1.0),
            Task::new("T3", f64::NAN),
        ];
        let errors = validate_input(&tasks, &sample_workers()).unwrap_err();
        let count = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidDuration)
            .count();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_invalid_skill_levels() {
        let tasks = vec![Task::new("T1", 1.0).with_requirement("rust", -1.0)];
        let workers = vec![Worker::new("W1").with_skill("rust", f64::INFINITY)];
        let errors = validate_input(&tasks, &workers).unwrap_err();
        let count = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidSkillLevel)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_cyclic_dependency() {
        // T1 → T2 → T3 → T1 (cycle)
        let tasks = vec![
            Task::new("T1", 1.0).with_dependency("T3"),
            Task::new("T2", 1.0).with_dependency("T1"),
            Task::new("T3", 1.0).with_dependency("T2"),
        ];
        let errors = validate_input(&tasks, &sample_workers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let tasks = vec![Task::new("T1", 1.0).with_dependency("T1")];
        let errors = validate_input(&tasks, &sample_workers()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::CyclicDependency);
    }

    #[test]
    fn test_multiple_errors() {
        let tasks = vec![
            Task::new("T1", 0.0),
            Task::new("T2", 1.0).with_dependency("UNKNOWN"),
        ];
        let errors = validate_input(&tasks, &[]).unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_topological_order_chain() {
        // 0 ← 1 ← 2, listed in reverse
        let deps = vec![vec![1], vec![2], vec![]];
        assert_eq!(topological_order(&deps).unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_topological_order_diamond_visits_once() {
        // 3 depends on 1 and 2, both depend on 0
        let deps = vec![vec![], vec![0], vec![0], vec![1, 2]];
        let order = topological_order(&deps).unwrap();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_topological_order_respects_every_edge() {
        let deps = vec![vec![4], vec![], vec![1, 0], vec![2], vec![1]];
        let order = topological_order(&deps).unwrap();
        assert_eq!(order.len(), 5);
        let pos: HashMap<usize, usize> = order.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        for (task, task_deps) in deps.iter().enumerate() {
            for dep in task_deps {
                assert!(pos[dep] < pos[&task]);
            }
        }
    }

    #[test]
    fn test_topological_order_deep_chain() {
        // Long chains must not recurse.
        let n = 100_000;
        let deps: Vec<Vec<usize>> = (0..n)
            .map(|i| if i + 1 < n { vec![i + 1] } else { vec![] })
            .collect();
        let order = topological_order(&deps).unwrap();
        assert_eq!(order.len(), n);
        assert_eq!(order[0], n - 1);
    }

    #[test]
    fn test_topological_order_cycle() {
        let deps = vec![vec![1], vec![0]];
        assert!(topological_order(&deps).is_err());
    }
}
