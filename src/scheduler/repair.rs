//! Timeline construction, repair, and constraint checking.
//!
//! # Algorithm
//!
//! [`repair_schedule`] walks the solution in locus order. Each task starts
//! at its gene's start time, moves right to the latest end of its already
//! placed dependencies, then moves right again until it fits in a gap of
//! its worker's busy list. Every placement is therefore overlap-free, and
//! dependency-respecting whenever dependencies appear earlier in the
//! solution than their dependents.
//!
//! [`check_schedule`] is the independent judge: it reports what is wrong
//! with any timeline, repaired or not.
//!
//! # Complexity
//! O(n · (d + k)) where n=tasks, d=dependencies per task, k=tasks per worker.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::BTreeMap;

use crate::models::{Problem, Schedule, ScheduledTask, Solution, Violation, ViolationType};

/// Tolerance for comparing start and end times.
const TIME_EPSILON: f64 = 1e-9;

/// Builds the literal timeline of a solution, without moving anything.
///
/// Each entry ends at `start + duration`. Assignments that name unknown
/// tasks or workers are left out and reported as violations, as is every
/// broken constraint found by [`check_schedule`].
pub fn build_schedule(problem: &Problem, solution: &Solution) -> Schedule {
    let mut schedule = Schedule::new();
    for a in solution {
        let Some((t, _)) = resolve(problem, &mut schedule, &a.task_id, &a.worker_id) else {
            continue;
        };
        let task = problem.task(t);
        schedule.add_entry(ScheduledTask::new(
            &a.task_id,
            &a.worker_id,
            a.start,
            a.start + task.duration,
        ));
    }
    let violations = check_schedule(problem, &schedule);
    schedule.violations.extend(violations);
    schedule
}

/// Recomputes dependency-respecting, overlap-free start times.
///
/// Worker choices are kept as they are; only start times move, and only
/// to the right. A task seen a second time is not placed again. The
/// returned schedule carries every violation that remains after repair.
///
/// # Example
/// ```
/// use u_skillsched::models::{Assignment, Problem, Solution, Task, Worker};
/// use u_skillsched::scheduler::repair_schedule;
///
/// let problem = Problem::new(
///     vec![Task::new("T1", 2.0), Task::new("T2", 3.0).with_dependency("T1")],
///     vec![Worker::new("W1")],
/// ).unwrap();
/// let solution = Solution::new(vec![
///     Assignment::new("T1", "W1", 0.0),
///     Assignment::new("T2", "W1", 0.0),
/// ]);
///
/// let schedule = repair_schedule(&problem, &solution);
/// assert!(schedule.is_valid());
/// assert_eq!(schedule.task_completion_time("T2"), Some(5.0));
/// ```
pub fn repair_schedule(problem: &Problem, solution: &Solution) -> Schedule {
    let mut schedule = Schedule::new();
    let mut end_times: Vec<Option<f64>> = vec![None; problem.task_count()];
    // Per worker: (start, end) intervals kept sorted by start.
    let mut busy: Vec<Vec<(f64, f64)>> = vec![Vec::new(); problem.worker_count()];

    for a in solution {
        let Some((t, w)) = resolve(problem, &mut schedule, &a.task_id, &a.worker_id) else {
            continue;
        };
        if end_times[t].is_some() {
            continue;
        }
        let task = problem.task(t);

        let mut start = if a.start.is_finite() { a.start.max(0.0) } else { 0.0 };
        for &dep in problem.dependencies(t) {
            if let Some(end) = end_times[dep] {
                start = start.max(end);
            }
        }

        let slots = &mut busy[w];
        for &(busy_start, busy_end) in slots.iter() {
            if start < busy_end {
                if start + task.duration <= busy_start {
                    break;
                }
                start = busy_end;
            }
        }
        let end = start + task.duration;
        let pos = slots.partition_point(|&(s, _)| s <= start);
        slots.insert(pos, (start, end));

        end_times[t] = Some(end);
        schedule.add_entry(ScheduledTask::new(&a.task_id, &a.worker_id, start, end));
    }

    let violations = check_schedule(problem, &schedule);
    schedule.violations.extend(violations);
    schedule
}

/// Whether the repaired timeline of `solution` is executable.
///
/// A solution can be infeasible as given yet feasible after repair; this
/// answers the latter question. Use [`build_schedule`] for the former.
///
/// Skill shortfall is a cost, not a timing constraint: it is still
/// reported on the repaired [`Schedule`] but does not make it infeasible.
/// The repaired timeline is judged as it stands, so a dependent listed
/// before its dependency is feasible if repair happens to leave it
/// starting after the dependency ends.
pub fn is_feasible(problem: &Problem, solution: &Solution) -> bool {
    repair_schedule(problem, solution)
        .violations
        .iter()
        .all(|v| v.violation_type == ViolationType::SkillMismatch)
}

/// Reports every constraint a timeline breaks.
///
/// # Checks
/// - every task appears exactly once
/// - every entry names a known task and worker
/// - no task starts before a dependency ends
/// - no two entries overlap on one worker
/// - every worker meets its task's skill requirements
pub fn check_schedule(problem: &Problem, schedule: &Schedule) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut counts = vec![0usize; problem.task_count()];

    for e in &schedule.entries {
        match problem.task_index(&e.task_id) {
            Some(t) => counts[t] += 1,
            None => violations.push(Violation::unknown_reference(
                &e.task_id,
                format!("Unknown task '{}'", e.task_id),
            )),
        }
        if problem.worker_index(&e.worker_id).is_none() {
            violations.push(Violation::unknown_reference(
                &e.worker_id,
                format!("Unknown worker '{}'", e.worker_id),
            ));
        }
    }

    for (t, &count) in counts.iter().enumerate() {
        let id = &problem.task(t).id;
        match count {
            1 => {}
            0 => violations.push(Violation::missing_task(id, format!("Task '{id}' is not scheduled"))),
            n => violations.push(Violation::missing_task(
                id,
                format!("Task '{id}' is scheduled {n} times"),
            )),
        }
    }

    for e in &schedule.entries {
        let Some(t) = problem.task_index(&e.task_id) else {
            continue;
        };
        for &dep in problem.dependencies(t) {
            let dep_id = &problem.task(dep).id;
            if let Some(dep_end) = schedule.task_completion_time(dep_id) {
                if e.start < dep_end - TIME_EPSILON {
                    violations.push(Violation::dependency_violation(
                        &e.task_id,
                        format!(
                            "Task '{}' starts at {} before dependency '{}' ends at {}",
                            e.task_id, e.start, dep_id, dep_end
                        ),
                    ));
                }
            }
        }

        if let (Some(task), Some(worker)) = (
            problem.task_by_id(&e.task_id),
            problem.worker_by_id(&e.worker_id),
        ) {
            let shortfall = worker.skill_shortfall(task);
            if shortfall > 0.0 {
                violations.push(Violation::skill_mismatch(
                    &e.task_id,
                    format!(
                        "Worker '{}' is short {shortfall} skill levels for task '{}'",
                        worker.id, task.id
                    ),
                ));
            }
        }
    }

    let mut by_worker: BTreeMap<&str, Vec<&ScheduledTask>> = BTreeMap::new();
    for e in &schedule.entries {
        by_worker.entry(e.worker_id.as_str()).or_default().push(e);
    }
    for (worker_id, mut entries) in by_worker {
        entries.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut latest: Option<&ScheduledTask> = None;
        for e in entries {
            if let Some(prev) = latest {
                if e.start < prev.end - TIME_EPSILON {
                    violations.push(Violation::worker_overlap(
                        worker_id,
                        format!(
                            "Tasks '{}' and '{}' overlap on worker '{worker_id}'",
                            prev.task_id, e.task_id
                        ),
                    ));
                }
                if e.end > prev.end {
                    latest = Some(e);
                }
            } else {
                latest = Some(e);
            }
        }
    }

    violations
}

/// Resolves a gene to `(task, worker)` indices, recording unknown references.
fn resolve(
    problem: &Problem,
    schedule: &mut Schedule,
    task_id: &str,
    worker_id: &str,
) -> Option<(usize, usize)> {
    let task = problem.task_index(task_id);
    if task.is_none() {
        schedule.add_violation(Violation::unknown_reference(
            task_id,
            format!("Unknown task '{task_id}'"),
        ));
    }
    let worker = problem.worker_index(worker_id);
    if worker.is_none() {
        schedule.add_violation(Violation::unknown_reference(
            worker_id,
            format!("Unknown worker '{worker_id}'"),
        ));
    }
    Some((task?, worker?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Task, ViolationType, Worker};

    fn chain_problem() -> Problem {
        Problem::new(
            vec![
                Task::new("T1", 2.0),
                Task::new("T2", 3.0).with_dependency("T1"),
                Task::new("T3", 5.0).with_dependency("T2"),
            ],
            vec![Worker::new("W1"), Worker::new("W2")],
        )
        .unwrap()
    }

    #[test]
    fn test_repair_chain_on_one_worker() {
        let p = chain_problem();
        let s = Solution::new(vec![
            Assignment::new("T1", "W1", 0.0),
            Assignment::new("T2", "W1", 0.0),
            Assignment::new("T3", "W1", 0.0),
        ]);

        let schedule = repair_schedule(&p, &s);
        assert!(schedule.is_valid());
        assert_eq!(schedule.task_completion_time("T1"), Some(2.0));
        assert_eq!(schedule.task_completion_time("T2"), Some(5.0));
        assert_eq!(schedule.task_completion_time("T3"), Some(10.0));
        assert!((schedule.makespan() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_repair_fills_gap() {
        let p = Problem::new(
            vec![Task::new("A", 2.0), Task::new("B", 3.0), Task::new("C", 1.0)],
            vec![Worker::new("W1")],
        )
        .unwrap();
        let s = Solution::new(vec![
            Assignment::new("A", "W1", 0.0),
            Assignment::new("B", "W1", 5.0),
            Assignment::new("C", "W1", 1.0),
        ]);

        let schedule = repair_schedule(&p, &s);
        assert!(schedule.is_valid());
        // C moves past A and fits in the [2, 5) gap before B.
        let c = schedule.entry_for_task("C").unwrap();
        assert!((c.start - 2.0).abs() < 1e-10);
        assert!((c.end - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_repair_skips_gap_too_small() {
        let p = Problem::new(
            vec![Task::new("A", 2.0), Task::new("B", 3.0), Task::new("C", 4.0)],
            vec![Worker::new("W1")],
        )
        .unwrap();
        let s = Solution::new(vec![
            Assignment::new("A", "W1", 0.0),
            Assignment::new("B", "W1", 5.0),
            Assignment::new("C", "W1", 1.0),
        ]);

        let schedule = repair_schedule(&p, &s);
        assert!(schedule.is_valid());
        let c = schedule.entry_for_task("C").unwrap();
        assert!((c.start - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_repair_dependency_out_of_order() {
        let p = chain_problem();
        // T2 is placed before T1, on a different worker, both at time 0.
        let s = Solution::new(vec![
            Assignment::new("T2", "W2", 0.0),
            Assignment::new("T1", "W1", 0.0),
            Assignment::new("T3", "W1", 0.0),
        ]);

        let schedule = repair_schedule(&p, &s);
        assert_eq!(schedule.violation_count(&ViolationType::DependencyViolation), 1);
        assert!(!is_feasible(&p, &s));
    }

    #[test]
    fn test_repair_reports_missing_and_unknown() {
        let p = chain_problem();
        let s = Solution::new(vec![
            Assignment::new("T1", "W1", 0.0),
            Assignment::new("T2", "W9", 0.0),
            Assignment::new("T1", "W2", 4.0),
        ]);

        let schedule = repair_schedule(&p, &s);
        assert_eq!(schedule.entry_count(), 1);
        assert_eq!(schedule.violation_count(&ViolationType::UnknownReference), 1);
        // T2 (unknown worker) and T3 (absent) are not scheduled.
        assert_eq!(schedule.violation_count(&ViolationType::MissingTask), 2);
    }

    #[test]
    fn test_build_schedule_detects_overlap_and_dependency() {
        let p = chain_problem();
        let s = Solution::new(vec![
            Assignment::new("T1", "W1", 0.0),
            Assignment::new("T2", "W1", 1.0),
            Assignment::new("T3", "W2", 4.0),
        ]);

        let schedule = build_schedule(&p, &s);
        assert_eq!(schedule.entry_count(), 3);
        assert_eq!(schedule.violation_count(&ViolationType::WorkerOverlap), 1);
        // T2 starts at 1, before T1 ends at 2.
        assert_eq!(schedule.violation_count(&ViolationType::DependencyViolation), 1);

        let repaired = repair_schedule(&p, &s);
        assert!(repaired.is_valid());
    }

    #[test]
    fn test_skill_mismatch_survives_repair() {
        let p = Problem::new(
            vec![Task::new("T1", 1.0).with_requirement("rust", 3.0)],
            vec![Worker::new("W1").with_skill("rust", 1.0)],
        )
        .unwrap();
        let s = Solution::new(vec![Assignment::new("T1", "W1", 0.0)]);

        let schedule = repair_schedule(&p, &s);
        assert_eq!(schedule.violation_count(&ViolationType::SkillMismatch), 1);
        assert!(!schedule.is_valid());
        assert!(is_feasible(&p, &s));
    }

    #[test]
    fn test_skill_shortfall_is_feasible() {
        let p = Problem::new(
            vec![Task::new("T1", 4.0).with_requirement("x", 5.0)],
            vec![Worker::new("W1").with_skill("x", 2.0)],
        )
        .unwrap();
        let s = Solution::new(vec![Assignment::new("T1", "W1", 0.0)]);

        assert!(is_feasible(&p, &s));
    }

    #[test]
    fn test_dependent_listed_first_judged_by_timeline() {
        let p = chain_problem();
        // T2 comes first but starts well after T1 ends.
        let late = Solution::new(vec![
            Assignment::new("T2", "W2", 10.0),
            Assignment::new("T1", "W1", 0.0),
            Assignment::new("T3", "W1", 0.0),
        ]);
        assert!(is_feasible(&p, &late));
        let schedule = repair_schedule(&p, &late);
        assert_eq!(schedule.entry_for_task("T3").unwrap().start, 13.0);

        // Same order, but T2 now starts before T1 ends.
        let early = Solution::new(vec![
            Assignment::new("T2", "W2", 1.0),
            Assignment::new("T1", "W1", 0.0),
            Assignment::new("T3", "W1", 0.0),
        ]);
        assert!(!is_feasible(&p, &early));
    }

    #[test]
    fn test_negative_and_nan_starts_clamp_to_zero() {
        let p = Problem::new(
            vec![Task::new("A", 1.0), Task::new("B", 1.0)],
            vec![Worker::new("W1"), Worker::new("W2")],
        )
        .unwrap();
        let s = Solution::new(vec![
            Assignment::new("A", "W1", -3.0),
            Assignment::new("B", "W2", f64::NAN),
        ]);

        let schedule = repair_schedule(&p, &s);
        assert!(schedule.is_valid());
        assert_eq!(schedule.entry_for_task("A").unwrap().start, 0.0);
        assert_eq!(schedule.entry_for_task("B").unwrap().start, 0.0);
    }
}
