//! First-improvement local search.
//!
//! Each iteration tries three moves from the incumbent: reassign a random
//! gene to any worker, shift a random start by up to half the task's
//! duration, and swap the workers of two loci. A move is kept only if it
//! strictly beats the best fitness so far. The search stops after
//! `max_iterations`, or after `max_no_improve` consecutive iterations in
//! which no move was kept.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{adjust_start, reassign_random, swap_workers};
use crate::error::ConfigError;
use crate::models::{Problem, Solution};

/// Local search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchConfig {
    /// Iteration budget (default: 100).
    pub max_iterations: usize,
    /// Consecutive non-improving iterations before stopping (default: 20).
    pub max_no_improve: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_no_improve: 20,
        }
    }
}

impl LocalSearchConfig {
    /// Short polish applied to offspring inside the evolution loop.
    pub fn offspring_polish() -> Self {
        Self {
            max_iterations: 20,
            max_no_improve: 5,
        }
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the patience.
    pub fn with_max_no_improve(mut self, n: usize) -> Self {
        self.max_no_improve = n;
        self
    }

    /// Checks the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_no_improve == 0 {
            return Err(ConfigError::invalid("max_no_improve", "must be at least 1"));
        }
        Ok(())
    }
}

/// Result of a local search.
#[derive(Debug, Clone)]
pub struct LocalSearchOutcome {
    /// Best solution found.
    pub solution: Solution,
    /// Its fitness.
    pub fitness: f64,
    /// Best fitness after each iteration (non-increasing).
    pub history: Vec<f64>,
    /// Iterations performed.
    pub iterations: usize,
}

/// Local search bound to a problem.
#[derive(Debug, Clone, Copy)]
pub struct LocalSearch<'p> {
    problem: &'p Problem,
    config: LocalSearchConfig,
}

impl<'p> LocalSearch<'p> {
    /// Creates a local search with default parameters.
    pub fn new(problem: &'p Problem) -> Self {
        Self {
            problem,
            config: LocalSearchConfig::default(),
        }
    }

    /// Sets the parameters.
    pub fn with_config(mut self, config: LocalSearchConfig) -> Self {
        self.config = config;
        self
    }

    /// The parameters.
    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    /// Improves `solution`, scoring candidates with `fitness`.
    ///
    /// The returned fitness never exceeds the input's.
    pub fn improve<R, F>(&self, solution: &Solution, mut fitness: F, rng: &mut R) -> LocalSearchOutcome
    where
        R: Rng,
        F: FnMut(&Solution) -> f64,
    {
        let mut best = solution.clone();
        let mut best_fitness = fitness(&best);
        let mut history = Vec::new();
        let mut iterations = 0;

        if best.is_empty() {
            return LocalSearchOutcome {
                solution: best,
                fitness: best_fitness,
                history,
                iterations,
            };
        }

        let mut stale = 0;
        for _ in 0..self.config.max_iterations {
            iterations += 1;
            let mut improved = false;

            for step in 0..3 {
                let mut candidate = best.clone();
                let idx = rng.random_range(0..candidate.len());
                match step {
                    0 => reassign_random(&mut candidate, idx, self.problem, rng),
                    1 => adjust_start(&mut candidate, idx, self.problem, 0.5, rng),
                    _ => swap_workers(&mut candidate, rng),
                }

                let f = fitness(&candidate);
                if f < best_fitness {
                    best = candidate;
                    best_fitness = f;
                    improved = true;
                }
            }
            history.push(best_fitness);

            if improved {
                stale = 0;
            } else {
                stale += 1;
                if stale >= self.config.max_no_improve {
                    break;
                }
            }
        }

        LocalSearchOutcome {
            solution: best,
            fitness: best_fitness,
            history,
            iterations,
        }
    }
}
