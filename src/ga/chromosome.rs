//! Gene-level moves on a [`Solution`].
//!
//! A solution is a positional chromosome: gene `i` is the assignment
//! `(task, worker, start)` at locus `i`. The moves here edit genes in place
//! and are shared by mutation, local search, and simulated annealing,
//! which differ only in how they weight and accept them.
//!
//! | Move | Effect |
//! |------|--------|
//! | [`reassign_qualified`] | new worker among those naming every required skill |
//! | [`reassign_random`] | new worker, uniform over all workers |
//! | [`adjust_start`] | start += U(−b, b), `b = fraction · duration`, clamped at 0 |
//! | [`swap_workers`] | two distinct loci exchange workers |
//! | [`shift_block`] | a contiguous run shares one time offset |
//!
//! Moves never change which task sits at a locus, so task coverage is
//! preserved by construction.
//!
//! # Reference
//! Hartmann (1998), "A competitive genetic algorithm for resource-constrained
//! project scheduling"

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::models::{Problem, Solution};

/// Uniform offset in `[-bound, bound]`; zero for a non-positive bound.
#[inline]
pub(crate) fn symmetric_offset<R: Rng>(bound: f64, rng: &mut R) -> f64 {
    if bound > 0.0 && bound.is_finite() {
        rng.random_range(-bound..=bound)
    } else {
        0.0
    }
}

/// Reassigns gene `idx` to a worker qualified for its task.
///
/// Falls back to any worker when nobody names every required skill.
/// No-op when the problem has no workers or the task is unknown.
pub fn reassign_qualified<R: Rng>(
    solution: &mut Solution,
    idx: usize,
    problem: &Problem,
    rng: &mut R,
) {
    let Some(gene) = solution.assignments.get_mut(idx) else {
        return;
    };
    let Some(task_idx) = problem.task_index(&gene.task_id) else {
        return;
    };

    let qualified = problem.qualified_workers(task_idx);
    let worker = if qualified.is_empty() {
        problem.workers().choose(rng)
    } else {
        qualified.choose(rng).map(|&w| problem.worker(w))
    };
    if let Some(worker) = worker {
        gene.worker_id.clone_from(&worker.id);
    }
}

/// Reassigns gene `idx` to a uniformly random worker.
pub fn reassign_random<R: Rng>(
    solution: &mut Solution,
    idx: usize,
    problem: &Problem,
    rng: &mut R,
) {
    if let (Some(gene), Some(worker)) = (
        solution.assignments.get_mut(idx),
        problem.workers().choose(rng),
    ) {
        gene.worker_id.clone_from(&worker.id);
    }
}

/// Moves gene `idx` by a uniform offset of at most `fraction · duration`.
///
/// The resulting start is clamped at zero.
pub fn adjust_start<R: Rng>(
    solution: &mut Solution,
    idx: usize,
    problem: &Problem,
    fraction: f64,
    rng: &mut R,
) {
    let Some(gene) = solution.assignments.get_mut(idx) else {
        return;
    };
    let Some(task) = problem.task_by_id(&gene.task_id) else {
        return;
    };
    let offset = symmetric_offset(fraction * task.duration, rng);
    gene.start = (gene.start + offset).max(0.0);
}

/// Exchanges the workers of two distinct random loci.
///
/// No-op for solutions with fewer than two genes.
pub fn swap_workers<R: Rng>(solution: &mut Solution, rng: &mut R) {
    let len = solution.len();
    if len < 2 {
        return;
    }
    let i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len - 1);
    if j >= i {
        j += 1;
    }

    let (lo, hi) = (i.min(j), i.max(j));
    let (left, right) = solution.assignments.split_at_mut(hi);
    std::mem::swap(&mut left[lo].worker_id, &mut right[0].worker_id);
}

/// Shifts a contiguous run of genes by one shared offset.
///
/// The run length is uniform in `1..=max(1, round(2·ratio))` and the offset
/// uniform in `±2·ratio`; starts are clamped at zero.
pub fn shift_block<R: Rng>(solution: &mut Solution, temperature_ratio: f64, rng: &mut R) {
    let len = solution.len();
    if len == 0 {
        return;
    }
    let max_run = ((2.0 * temperature_ratio).round() as usize).clamp(1, len);
    let run = rng.random_range(1..=max_run);
    let first = rng.random_range(0..=len - run);
    let offset = symmetric_offset(2.0 * temperature_ratio, rng);

    for gene in &mut solution.assignments[first..first + run] {
        gene.start = (gene.start + offset).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Task, Worker};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_problem() -> Problem {
        Problem::new(
            vec![
                Task::new("T1", 4.0).with_requirement("weld", 3.0),
                Task::new("T2", 2.0),
                Task::new("T3", 1.0),
            ],
            vec![
                Worker::new("W1").with_skill("weld", 1.0),
                Worker::new("W2"),
                Worker::new("W3"),
            ],
        )
        .unwrap()
    }

    fn sample_solution() -> Solution {
        Solution::new(vec![
            Assignment::new("T1", "W2", 0.0),
            Assignment::new("T2", "W2", 4.0),
            Assignment::new("T3", "W3", 6.0),
        ])
    }

    fn task_ids(s: &Solution) -> Vec<&str> {
        s.iter().map(|a| a.task_id.as_str()).collect()
    }

    #[test]
    fn test_reassign_qualified_prefers_skill_holders() {
        let p = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut s = sample_solution();
            reassign_qualified(&mut s, 0, &p, &mut rng);
            // Only W1 names "weld"
            assert_eq!(s.assignments[0].worker_id, "W1");
        }
    }

    #[test]
    fn test_reassign_random_uses_known_workers() {
        let p = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut s = sample_solution();
        for _ in 0..20 {
            reassign_random(&mut s, 1, &p, &mut rng);
            assert!(p.worker_by_id(&s.assignments[1].worker_id).is_some());
        }
        assert_eq!(task_ids(&s), vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_adjust_start_bounded_and_non_negative() {
        let p = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut s = sample_solution();
            adjust_start(&mut s, 1, &p, 0.5, &mut rng);
            let start = s.assignments[1].start;
            // T2: duration 2, bound 1
            assert!((3.0..=5.0).contains(&start));

            adjust_start(&mut s, 0, &p, 0.5, &mut rng);
            assert!(s.assignments[0].start >= 0.0);
        }
    }

    #[test]
    fn test_adjust_start_zero_fraction_is_noop() {
        let p = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut s = sample_solution();
        adjust_start(&mut s, 2, &p, 0.0, &mut rng);
        assert_eq!(s, sample_solution());
    }

    #[test]
    fn test_swap_workers_distinct_loci() {
        let mut rng = SmallRng::seed_from_u64(42);
        let original = sample_solution();
        for _ in 0..20 {
            let mut s = original.clone();
            swap_workers(&mut s, &mut rng);
            assert_eq!(task_ids(&s), task_ids(&original));

            let mut before: Vec<&str> = original.iter().map(|a| a.worker_id.as_str()).collect();
            let mut after: Vec<&str> = s.iter().map(|a| a.worker_id.as_str()).collect();
            before.sort_unstable();
            after.sort_unstable();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_swap_workers_single_gene_noop() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut s = Solution::new(vec![Assignment::new("T1", "W1", 0.0)]);
        swap_workers(&mut s, &mut rng);
        assert_eq!(s.assignments[0].worker_id, "W1");
    }

    #[test]
    fn test_shift_block_offsets() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let original = sample_solution();
            let mut s = original.clone();
            shift_block(&mut s, 1.0, &mut rng);

            let moved: Vec<f64> = s
                .iter()
                .zip(original.iter())
                .map(|(a, b)| a.start - b.start)
                .collect();
            for (gene, d) in s.iter().zip(&moved) {
                assert!(gene.start >= 0.0);
                assert!(d.abs() <= 2.0 + 1e-12);
            }
            // At most two genes move at ratio 1.0
            assert!(moved.iter().filter(|d| d.abs() > 0.0).count() <= 2);
        }
    }

    #[test]
    fn test_shift_block_zero_ratio_is_noop() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut s = sample_solution();
        shift_block(&mut s, 0.0, &mut rng);
        assert_eq!(s, sample_solution());
    }
}
