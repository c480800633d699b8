//! Multi-objective fitness for scheduling solutions.
//!
//! ```text
//! F(s) = w_time·P_time + w_dep·P_dep + w_skill·P_skill + w_load·P_load + w_overlap·P_overlap
//! ```
//!
//! Every term is a penalty (lower = better). Durations enter normalized by
//! the total work `D = Σ duration`, so the same weights work for problems
//! measured in hours or in days.
//!
//! | Term | Definition |
//! |------|-----------|
//! | `P_time` | `100 · (max completion − min start) / D` |
//! | `P_dep` | `Σ 300 · violation / D` over late-starting dependents |
//! | `P_skill` | `Σ 200 · (required − actual)` over unmet requirements |
//! | `P_load` | `100 · (max load − min load) / avg load` |
//! | `P_overlap` | `Σ 400 · overlap / D` over adjacent intervals per worker |
//!
//! Structurally invalid solutions (missing, duplicated, or unknown tasks,
//! unknown workers) score `+∞`, as do degenerate problems where the
//! average workload is zero.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Problem, Solution};

/// Weights of the five penalty terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Makespan weight (default: 1).
    pub time: f64,
    /// Dependency violation weight (default: 3).
    pub dependency: f64,
    /// Skill shortfall weight (default: 2).
    pub skill: f64,
    /// Workload imbalance weight (default: 1).
    pub workload: f64,
    /// Worker overlap weight (default: 4).
    pub overlap: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            time: 1.0,
            dependency: 3.0,
            skill: 2.0,
            workload: 1.0,
            overlap: 4.0,
        }
    }
}

/// Unweighted penalty terms of one solution, plus the weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    /// Makespan penalty.
    pub time: f64,
    /// Dependency violation penalty.
    pub dependency: f64,
    /// Skill shortfall penalty.
    pub skill: f64,
    /// Workload imbalance penalty (`+∞` when the average load is zero).
    pub workload: f64,
    /// Worker overlap penalty.
    pub overlap: f64,
    /// Weighted sum.
    pub total: f64,
}

/// Scores solutions against a problem.
///
/// Pure and stateless; safe to share across threads.
///
/// # Example
/// ```
/// use u_skillsched::ga::FitnessEvaluator;
/// use u_skillsched::models::{Assignment, Problem, Solution, Task, Worker};
///
/// let problem = Problem::new(
///     vec![Task::new("T1", 2.0)],
///     vec![Worker::new("W1")],
/// ).unwrap();
/// let solution = Solution::new(vec![Assignment::new("T1", "W1", 0.0)]);
/// let fitness = FitnessEvaluator::new(&problem).evaluate(&solution);
/// assert!((fitness - 100.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator<'p> {
    problem: &'p Problem,
    weights: FitnessWeights,
}

impl<'p> FitnessEvaluator<'p> {
    /// Creates an evaluator with default weights.
    pub fn new(problem: &'p Problem) -> Self {
        Self {
            problem,
            weights: FitnessWeights::default(),
        }
    }

    /// Sets the term weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// The problem being scored.
    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    /// The term weights.
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Fitness of a solution (lower = better, `+∞` = invalid).
    pub fn evaluate(&self, solution: &Solution) -> f64 {
        self.breakdown(solution)
            .map_or(f64::INFINITY, |b| b.total)
    }

    /// Computes every penalty term.
    ///
    /// Returns `None` for structurally invalid solutions: wrong task
    /// coverage, unknown task or worker IDs, or a dependency without an
    /// assignment.
    pub fn breakdown(&self, solution: &Solution) -> Option<FitnessBreakdown> {
        let problem = self.problem;
        let n = problem.task_count();
        let total_duration = problem.total_duration();
        if n == 0 || solution.len() != n || total_duration <= 0.0 {
            return None;
        }

        let mut start = vec![f64::NAN; n];
        let mut completion = vec![f64::NAN; n];
        let mut workloads = vec![0.0; problem.worker_count()];
        let mut timelines: Vec<Vec<(f64, f64)>> = vec![Vec::new(); problem.worker_count()];
        let mut covered = HashSet::with_capacity(n);
        let mut p_skill = 0.0;

        for a in solution {
            let t = problem.task_index(&a.task_id)?;
            let w = problem.worker_index(&a.worker_id)?;
            covered.insert(t);

            let task = problem.task(t);
            let end = a.start + task.duration;
            start[t] = a.start;
            completion[t] = end;
            workloads[w] += task.duration;
            timelines[w].push((a.start, end));

            let worker = problem.worker(w);
            for (skill, &required) in &task.skill_requirements {
                let actual = worker.skill_level(skill);
                if actual < required {
                    p_skill += 200.0 * (required - actual);
                }
            }
        }

        if covered.len() != n {
            return None;
        }

        // Time
        let first_start = start.iter().copied().fold(f64::INFINITY, f64::min);
        let last_end = completion.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let p_time = 100.0 * (last_end - first_start) / total_duration;

        // Dependencies
        let mut p_dep = 0.0;
        for t in 0..n {
            for &d in problem.dependencies(t) {
                if completion[d].is_nan() {
                    return None;
                }
                if start[t] < completion[d] {
                    p_dep += 300.0 * ((completion[d] - start[t]) / total_duration);
                }
            }
        }

        // Workload balance
        let avg = if workloads.is_empty() {
            0.0
        } else {
            total_duration / workloads.len() as f64
        };
        let p_load = if avg == 0.0 || !avg.is_finite() {
            f64::INFINITY
        } else {
            let max = workloads.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = workloads.iter().copied().fold(f64::INFINITY, f64::min);
            100.0 * (max - min) / avg
        };

        // Overlaps
        let mut p_overlap = 0.0;
        for timeline in &mut timelines {
            timeline.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
            for pair in timeline.windows(2) {
                let (_, prev_end) = pair[0];
                let (next_start, _) = pair[1];
                if prev_end > next_start {
                    p_overlap += 400.0 * ((prev_end - next_start) / total_duration);
                }
            }
        }

        let w = &self.weights;
        let total = w.time * p_time
            + w.dependency * p_dep
            + w.skill * p_skill
            + w.workload * p_load
            + w.overlap * p_overlap;

        Some(FitnessBreakdown {
            time: p_time,
            dependency: p_dep,
            skill: p_skill,
            workload: p_load,
            overlap: p_overlap,
            total: if total.is_nan() { f64::INFINITY } else { total },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Task, Worker};

    fn chain_problem() -> Problem {
        Problem::new(
            vec![
                Task::new("T1", 2.0),
                Task::new("T2", 3.0).with_dependency("T1"),
                Task::new("T3", 1.0).with_dependency("T2"),
            ],
            vec![Worker::new("W1"), Worker::new("W2")],
        )
        .unwrap()
    }

    fn clean_solution() -> Solution {
        Solution::new(vec![
            Assignment::new("T1", "W1", 0.0),
            Assignment::new("T2", "W2", 2.0),
            Assignment::new("T3", "W1", 5.0),
        ])
    }

    #[test]
    fn test_clean_schedule_terms() {
        let p = chain_problem();
        let b = FitnessEvaluator::new(&p).breakdown(&clean_solution()).unwrap();

        // makespan 6 over D = 6
        assert!((b.time - 100.0).abs() < 1e-10);
        assert_eq!(b.dependency, 0.0);
        assert_eq!(b.overlap, 0.0);
        assert_eq!(b.skill, 0.0);
        // loads 3 and 3
        assert!((b.workload - 0.0).abs() < 1e-10);
        assert!((b.total - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_missing_task_is_infinite() {
        let p = chain_problem();
        let mut s = clean_solution();
        s.assignments.pop();
        assert_eq!(FitnessEvaluator::new(&p).evaluate(&s), f64::INFINITY);
    }

    #[test]
    fn test_duplicate_task_is_infinite() {
        let p = chain_problem();
        let mut s = clean_solution();
        s.assignments[2] = Assignment::new("T1", "W1", 5.0);
        assert_eq!(FitnessEvaluator::new(&p).evaluate(&s), f64::INFINITY);
    }

    #[test]
    fn test_unknown_worker_is_infinite() {
        let p = chain_problem();
        let mut s = clean_solution();
        s.assignments[0].worker_id = "ghost".into();
        assert_eq!(FitnessEvaluator::new(&p).evaluate(&s), f64::INFINITY);
    }

    #[test]
    fn test_dependency_penalty() {
        let p = chain_problem();
        let mut s = clean_solution();
        // T2 starts 1.0 before T1 completes
        s.assignments[1].start = 1.0;
        let b = FitnessEvaluator::new(&p).breakdown(&s).unwrap();
        assert!((b.dependency - 300.0 * (1.0 / 6.0)).abs() < 1e-10);
    }

    #[test]
    fn test_overlap_penalty() {
        let p = chain_problem();
        let s = Solution::new(vec![
            Assignment::new("T1", "W1", 0.0),
            Assignment::new("T2", "W1", 2.0),
            Assignment::new("T3", "W1", 4.0), // overlaps T2 by 1.0
        ]);
        let b = FitnessEvaluator::new(&p).breakdown(&s).unwrap();
        assert!((b.overlap - 400.0 * (1.0 / 6.0)).abs() < 1e-10);
        // T3 also violates its dependency on T2 by 1.0
        assert!((b.dependency - 50.0).abs() < 1e-10);
        // W1 carries everything, W2 nothing: (6 - 0) / 3
        assert!((b.workload - 200.0).abs() < 1e-10);
    }

    #[test]
    fn test_skill_penalty() {
        let p = Problem::new(
            vec![Task::new("T1", 1.0).with_requirement("x", 5.0)],
            vec![Worker::new("W1").with_skill("x", 2.0), Worker::new("W2").with_skill("x", 5.0)],
        )
        .unwrap();
        let eval = FitnessEvaluator::new(&p);

        let weak = Solution::new(vec![Assignment::new("T1", "W1", 0.0)]);
        let strong = Solution::new(vec![Assignment::new("T1", "W2", 0.0)]);

        let bw = eval.breakdown(&weak).unwrap();
        let bs = eval.breakdown(&strong).unwrap();
        assert!((bw.skill - 600.0).abs() < 1e-10);
        assert_eq!(bs.skill, 0.0);
        assert!((bw.total - bs.total - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_workers_is_infinite() {
        let p = Problem::new(vec![Task::new("T1", 1.0)], vec![]).unwrap();
        let s = Solution::new(vec![Assignment::new("T1", "W1", 0.0)]);
        assert_eq!(FitnessEvaluator::new(&p).evaluate(&s), f64::INFINITY);
    }

    #[test]
    fn test_custom_weights() {
        let p = chain_problem();
        let weights = FitnessWeights {
            time: 2.0,
            ..FitnessWeights::default()
        };
        let f = FitnessEvaluator::new(&p)
            .with_weights(weights)
            .evaluate(&clean_solution());
        assert!((f - 200.0).abs() < 1e-10);
    }

    #[test]
    fn test_order_does_not_matter() {
        let p = chain_problem();
        let eval = FitnessEvaluator::new(&p);
        let mut reversed = clean_solution();
        reversed.assignments.reverse();
        assert!((eval.evaluate(&reversed) - eval.evaluate(&clean_solution())).abs() < 1e-10);
    }

    #[test]
    fn test_weights_deserialize_partial() {
        let w: FitnessWeights = serde_json::from_str(r#"{"overlap": 10.0}"#).unwrap();
        assert_eq!(w.overlap, 10.0);
        assert_eq!(w.dependency, 3.0);
    }
}
