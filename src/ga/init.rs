//! Population initialization strategies.
//!
//! | Strategy | Task order | Worker choice | Start time |
//! |----------|-----------|---------------|-----------|
//! | `Random` | shuffled | uniform | running end of the sequence |
//! | `Intelligent` | topological | max(skill match − worker end) | max(deps ready, worker end) |
//! | `Hybrid` | 30% `Random`, 70% `Intelligent` per solution | | |
//! | `DependencyBased` | topological | uniform | max(clock, deps ready) |
//! | `SkillBased` | shuffled | max(skill match) | running end of the sequence |
//!
//! Ties in worker scoring go to the first worker in table order.

use std::fmt;
use std::str::FromStr;

use rand::prelude::IndexedRandom;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{Assignment, Problem, Solution, Worker};

/// Share of `Random` solutions in a `Hybrid` population.
const HYBRID_RANDOM_SHARE: f64 = 0.3;

/// How initial solutions are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// Shuffled tasks on random workers.
    Random,
    /// Dependency-ordered greedy on skill match and availability.
    Intelligent,
    /// Mix of `Random` and `Intelligent`.
    #[default]
    Hybrid,
    /// Dependency-ordered tasks on random workers.
    DependencyBased,
    /// Shuffled tasks on the best-matching worker.
    SkillBased,
}

impl InitStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [InitStrategy; 5] = [
        InitStrategy::Random,
        InitStrategy::Intelligent,
        InitStrategy::Hybrid,
        InitStrategy::DependencyBased,
        InitStrategy::SkillBased,
    ];

    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            InitStrategy::Random => "random",
            InitStrategy::Intelligent => "intelligent",
            InitStrategy::Hybrid => "hybrid",
            InitStrategy::DependencyBased => "dependency_based",
            InitStrategy::SkillBased => "skill_based",
        }
    }
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownInitStrategy(s.to_string()))
    }
}

/// Builds initial solutions for one problem.
///
/// # Example
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_skillsched::ga::{InitStrategy, PopulationInitializer};
/// use u_skillsched::models::{Problem, Task, Worker};
///
/// let problem = Problem::new(
///     vec![Task::new("T1", 2.0), Task::new("T2", 1.0).with_dependency("T1")],
///     vec![Worker::new("W1"), Worker::new("W2")],
/// ).unwrap();
/// let init = PopulationInitializer::new(&problem, InitStrategy::Intelligent).unwrap();
/// let mut rng = SmallRng::seed_from_u64(42);
/// let population = init.create_population(10, &mut rng);
/// assert_eq!(population.len(), 10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PopulationInitializer<'p> {
    problem: &'p Problem,
    strategy: InitStrategy,
}

impl<'p> PopulationInitializer<'p> {
    /// Creates an initializer.
    ///
    /// # Errors
    /// [`ConfigError::NoWorkers`] or [`ConfigError::NoTasks`] when the
    /// problem cannot yield a complete solution.
    pub fn new(problem: &'p Problem, strategy: InitStrategy) -> Result<Self, ConfigError> {
        if problem.worker_count() == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if problem.task_count() == 0 {
            return Err(ConfigError::NoTasks);
        }
        Ok(Self { problem, strategy })
    }

    /// The configured strategy.
    pub fn strategy(&self) -> InitStrategy {
        self.strategy
    }

    /// Builds `size` solutions.
    pub fn create_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Solution> {
        (0..size).map(|_| self.create_solution(rng)).collect()
    }

    /// Builds one solution with the configured strategy.
    pub fn create_solution<R: Rng>(&self, rng: &mut R) -> Solution {
        match self.strategy {
            InitStrategy::Random => self.random(rng),
            InitStrategy::Intelligent => self.intelligent(),
            InitStrategy::Hybrid => {
                if rng.random::<f64>() < HYBRID_RANDOM_SHARE {
                    self.random(rng)
                } else {
                    self.intelligent()
                }
            }
            InitStrategy::DependencyBased => self.dependency_based(rng),
            InitStrategy::SkillBased => self.skill_based(rng),
        }
    }

    fn shuffled_tasks<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.problem.task_count()).collect();
        order.shuffle(rng);
        order
    }

    fn random_worker<R: Rng>(&self, rng: &mut R) -> &'p Worker {
        // Non-empty: checked in `new`.
        let workers = self.problem.workers();
        workers.choose(rng).unwrap_or(&workers[0])
    }

    /// Places `order` back to back, picking a worker per task.
    fn sequential(&self, order: &[usize], mut pick: impl FnMut(usize) -> &'p Worker) -> Solution {
        let mut clock = 0.0;
        order
            .iter()
            .map(|&t| {
                let task = self.problem.task(t);
                let gene = Assignment::new(task.id.clone(), pick(t).id.clone(), clock);
                clock += task.duration;
                gene
            })
            .collect()
    }

    fn random<R: Rng>(&self, rng: &mut R) -> Solution {
        let order = self.shuffled_tasks(rng);
        self.sequential(&order, |_| self.random_worker(rng))
    }

    fn skill_based<R: Rng>(&self, rng: &mut R) -> Solution {
        let order = self.shuffled_tasks(rng);
        self.sequential(&order, |t| self.best_skill_match(t))
    }

    fn best_skill_match(&self, task_idx: usize) -> &'p Worker {
        let task = self.problem.task(task_idx);
        let workers = self.problem.workers();
        let mut best = &workers[0];
        let mut best_score = f64::NEG_INFINITY;
        for worker in workers {
            let score = worker.skill_match(task);
            if score > best_score {
                best_score = score;
                best = worker;
            }
        }
        best
    }

    /// Latest completion among already-placed dependencies.
    fn dependency_ready(&self, task_idx: usize, completion: &[Option<f64>]) -> f64 {
        self.problem
            .dependencies(task_idx)
            .iter()
            .filter_map(|&d| completion[d])
            .fold(0.0, f64::max)
    }

    fn intelligent(&self) -> Solution {
        let problem = self.problem;
        let mut completion: Vec<Option<f64>> = vec![None; problem.task_count()];
        let mut worker_end = vec![0.0_f64; problem.worker_count()];
        let mut genes = Vec::with_capacity(problem.task_count());

        for &t in problem.topological_order() {
            let task = problem.task(t);
            let ready = self.dependency_ready(t, &completion);

            let mut best = 0;
            let mut best_score = f64::NEG_INFINITY;
            for (w, worker) in problem.workers().iter().enumerate() {
                let score = worker.skill_match(task) - worker_end[w];
                if score > best_score {
                    best_score = score;
                    best = w;
                }
            }

            let start = ready.max(worker_end[best]);
            let end = start + task.duration;
            worker_end[best] = end;
            completion[t] = Some(end);
            genes.push(Assignment::new(
                task.id.clone(),
                problem.worker(best).id.clone(),
                start,
            ));
        }
        Solution::new(genes)
    }

    fn dependency_based<R: Rng>(&self, rng: &mut R) -> Solution {
        let problem = self.problem;
        let mut completion: Vec<Option<f64>> = vec![None; problem.task_count()];
        let mut clock = 0.0_f64;
        let mut genes = Vec::with_capacity(problem.task_count());

        for &t in problem.topological_order() {
            let task = problem.task(t);
            clock = clock.max(self.dependency_ready(t, &completion));
            let worker = self.random_worker(rng);
            genes.push(Assignment::new(task.id.clone(), worker.id.clone(), clock));
            completion[t] = Some(clock + task.duration);
            clock += task.duration;
        }
        Solution::new(genes)
    }
}
