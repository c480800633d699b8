//! Schedule quality metrics (KPIs).
//!
//! Computes workforce-oriented performance indicators from a timeline and
//! the problem it was built for.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan | Latest end minus earliest start |
//! | Workload | Busy time per worker (idle workers count as 0) |
//! | Utilization | Workload / makespan |
//! | Workload Imbalance | (max load − min load) / avg load |
//! | Skill Shortfall | Sum of missing skill levels over all entries |
//! | Violations | Number of recorded violations |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Problem, Schedule};

/// Schedule performance indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Latest end minus earliest start.
    pub makespan: f64,
    /// Busy time per worker, including idle workers.
    pub workload_by_worker: BTreeMap<String, f64>,
    /// Per-worker utilization (0.0..1.0 for overlap-free timelines).
    pub utilization_by_worker: BTreeMap<String, f64>,
    /// Mean utilization over all workers.
    pub avg_utilization: f64,
    /// Relative spread of workloads; 0 when perfectly balanced.
    pub workload_imbalance: f64,
    /// Total missing skill level across all entries.
    pub skill_shortfall: f64,
    /// Number of violations carried by the schedule.
    pub violation_count: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its problem.
    ///
    /// Entries naming unknown tasks or workers are ignored for the skill
    /// metric; workloads are reported for every worker of the problem.
    pub fn calculate(problem: &Problem, schedule: &Schedule) -> Self {
        let makespan = schedule.makespan();

        let mut workload_by_worker: BTreeMap<String, f64> = problem
            .workers()
            .iter()
            .map(|w| (w.id.clone(), 0.0))
            .collect();
        for (worker_id, busy) in schedule.workloads() {
            if let Some(load) = workload_by_worker.get_mut(&worker_id) {
                *load = busy;
            }
        }

        let utilization_by_worker: BTreeMap<String, f64> = workload_by_worker
            .keys()
            .map(|id| {
                let util = schedule.worker_utilization(id, makespan).unwrap_or(0.0);
                (id.clone(), util)
            })
            .collect();

        let avg_utilization = mean(utilization_by_worker.values().copied());

        let avg_load = mean(workload_by_worker.values().copied());
        let workload_imbalance = if avg_load > 0.0 {
            let max = workload_by_worker.values().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = workload_by_worker.values().copied().fold(f64::INFINITY, f64::min);
            (max - min) / avg_load
        } else {
            0.0
        };

        let skill_shortfall = schedule
            .entries
            .iter()
            .filter_map(|e| {
                let task = problem.task_by_id(&e.task_id)?;
                let worker = problem.worker_by_id(&e.worker_id)?;
                Some(worker.skill_shortfall(task))
            })
            .sum();

        Self {
            makespan,
            workload_by_worker,
            utilization_by_worker,
            avg_utilization,
            workload_imbalance,
            skill_shortfall,
            violation_count: schedule.violations.len(),
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_makespan: f64, max_imbalance: f64) -> bool {
        self.violation_count == 0
            && self.makespan <= max_makespan
            && self.workload_imbalance <= max_imbalance
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScheduledTask, Task, Violation, Worker};

    fn problem() -> Problem {
        Problem::new(
            vec![
                Task::new("T1", 2.0),
                Task::new("T2", 1.0).with_requirement("rust", 3.0),
            ],
            vec![
                Worker::new("W1"),
                Worker::new("W2").with_skill("rust", 1.0),
                Worker::new("W3"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_kpi_basic() {
        let p = problem();
        let mut schedule = Schedule::new();
        schedule.add_entry(ScheduledTask::new("T1", "W1", 0.0, 2.0));
        schedule.add_entry(ScheduledTask::new("T2", "W2", 0.0, 1.0));

        let kpi = ScheduleKpi::calculate(&p, &schedule);
        assert!((kpi.makespan - 2.0).abs() < 1e-10);
        assert_eq!(kpi.workload_by_worker.len(), 3);
        assert!((kpi.workload_by_worker["W3"] - 0.0).abs() < 1e-10);
        // W1: 2/2 = 1.0, W2: 1/2 = 0.5, W3: 0
        assert!((kpi.utilization_by_worker["W1"] - 1.0).abs() < 1e-10);
        assert!((kpi.utilization_by_worker["W2"] - 0.5).abs() < 1e-10);
        assert!((kpi.avg_utilization - 0.5).abs() < 1e-10);
        // loads 2, 1, 0; avg 1 → (2 - 0) / 1
        assert!((kpi.workload_imbalance - 2.0).abs() < 1e-10);
        assert!((kpi.skill_shortfall - 2.0).abs() < 1e-10);
        assert_eq!(kpi.violation_count, 0);
    }

    #[test]
    fn test_kpi_empty() {
        let p = problem();
        let kpi = ScheduleKpi::calculate(&p, &Schedule::new());
        assert_eq!(kpi.makespan, 0.0);
        assert_eq!(kpi.avg_utilization, 0.0);
        assert_eq!(kpi.workload_imbalance, 0.0);
        assert_eq!(kpi.skill_shortfall, 0.0);
    }

    #[test]
    fn test_meets_thresholds() {
        let p = problem();
        let mut schedule = Schedule::new();
        schedule.add_entry(ScheduledTask::new("T1", "W1", 0.0, 2.0));
        schedule.add_entry(ScheduledTask::new("T2", "W3", 0.0, 1.0));

        let kpi = ScheduleKpi::calculate(&p, &schedule);
        assert!(kpi.meets_thresholds(2.0, 2.0));
        assert!(!kpi.meets_thresholds(1.5, 2.0));
        assert!(!kpi.meets_thresholds(2.0, 1.0));

        schedule.add_violation(Violation::worker_overlap("W1", "synthetic"));
        let kpi = ScheduleKpi::calculate(&p, &schedule);
        assert_eq!(kpi.violation_count, 1);
        assert!(!kpi.meets_thresholds(10.0, 10.0));
    }
}
