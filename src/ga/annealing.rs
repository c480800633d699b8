//! Simulated annealing refinement.
//!
//! Geometric cooling `T ← T · cooling_rate` from `initial_temp`. Each
//! iteration samples several neighbours of the current solution and keeps
//! the best one, then applies a relative Metropolis criterion:
//!
//! ```text
//! P(accept) = 1                                      if new < old
//!           = exp(−((new − old) / old) / (ratio · 0.1))  otherwise
//! ```
//!
//! where `ratio = T / initial_temp`. Neighbour moves are weighted by the
//! same ratio:
//!
//! | ratio | reassign | adjust time | swap |
//! |-------|----------|-------------|------|
//! | `> 0.7` | 0.4 | 0.4 | 0.2 |
//! | `> 0.3` | 0.5 | 0.4 | 0.1 |
//! | otherwise | 0.3 | 0.6 | 0.1 |
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chromosome::{adjust_start, reassign_qualified, swap_workers};
use crate::error::ConfigError;
use crate::models::{Problem, Solution};

/// Annealing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Iteration budget (default: 100).
    pub max_iterations: usize,
    /// Starting temperature (default: 1000).
    pub initial_temp: f64,
    /// Multiplicative cooling per iteration (default: 0.95).
    pub cooling_rate: f64,
    /// Stop once the temperature drops below this (default: 0.1).
    pub min_temp: f64,
    /// Neighbours sampled per iteration (default: 3).
    pub neighbors: usize,
    /// Consecutive iterations without a new best before stopping (default: 50).
    pub patience: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            initial_temp: 1000.0,
            cooling_rate: 0.95,
            min_temp: 0.1,
            neighbors: 3,
            patience: 50,
        }
    }
}

impl AnnealingConfig {
    /// Short, cool schedule used to refine a generation's best offspring.
    pub fn refinement() -> Self {
        Self {
            max_iterations: 50,
            initial_temp: 100.0,
            cooling_rate: 0.90,
            min_temp: 0.1,
            ..Self::default()
        }
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the starting temperature.
    pub fn with_initial_temp(mut self, t: f64) -> Self {
        self.initial_temp = t;
        self
    }

    /// Sets the cooling rate.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    /// Sets the temperature floor.
    pub fn with_min_temp(mut self, t: f64) -> Self {
        self.min_temp = t;
        self
    }

    /// Checks the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_temp.is_finite() || self.initial_temp <= 0.0 {
            return Err(ConfigError::invalid("initial_temp", "must be positive and finite"));
        }
        if self.cooling_rate.is_nan() || self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(ConfigError::invalid("cooling_rate", "must be in (0, 1)"));
        }
        if self.min_temp.is_nan() || self.min_temp <= 0.0 {
            return Err(ConfigError::invalid("min_temp", "must be positive"));
        }
        if self.neighbors == 0 {
            return Err(ConfigError::invalid("neighbors", "must be at least 1"));
        }
        Ok(())
    }
}

/// Neighbour move weights (reassign, adjust time, swap) for a temperature ratio.
pub fn neighbor_weights(temperature_ratio: f64) -> [f64; 3] {
    if temperature_ratio > 0.7 {
        [0.4, 0.4, 0.2]
    } else if temperature_ratio > 0.3 {
        [0.5, 0.4, 0.1]
    } else {
        [0.3, 0.6, 0.1]
    }
}

/// Probability of moving from fitness `old` to `new` at `temperature_ratio`.
///
/// Worse moves are rejected when `old` is not positive and finite.
pub fn acceptance_probability(old: f64, new: f64, temperature_ratio: f64) -> f64 {
    if new < old {
        return 1.0;
    }
    if !old.is_finite() || old <= 0.0 || temperature_ratio <= 0.0 {
        return 0.0;
    }
    let relative = (new - old) / old;
    let p = (-relative / (temperature_ratio * 0.1)).exp();
    if p.is_nan() {
        0.0
    } else {
        p
    }
}

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealingOutcome {
    /// Best solution seen.
    pub solution: Solution,
    /// Its fitness (never above the input's).
    pub fitness: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Moves accepted despite a worse fitness.
    pub accepted_worse: usize,
    /// Temperature when the run stopped.
    pub final_temperature: f64,
}

/// Simulated annealing bound to a problem.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedAnnealing<'p> {
    problem: &'p Problem,
    config: AnnealingConfig,
}

impl<'p> SimulatedAnnealing<'p> {
    /// Creates an annealer with default parameters.
    pub fn new(problem: &'p Problem) -> Self {
        Self {
            problem,
            config: AnnealingConfig::default(),
        }
    }

    /// Sets the parameters.
    pub fn with_config(mut self, config: AnnealingConfig) -> Self {
        self.config = config;
        self
    }

    /// The parameters.
    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    fn neighbor<R: Rng>(&self, current: &Solution, ratio: f64, rng: &mut R) -> Solution {
        let mut candidate = current.clone();
        let idx = rng.random_range(0..candidate.len());
        let step = WeightedIndex::new(neighbor_weights(ratio))
            .map(|wheel| wheel.sample(rng))
            .unwrap_or(0);
        match step {
            0 => reassign_qualified(&mut candidate, idx, self.problem, rng),
            1 => adjust_start(&mut candidate, idx, self.problem, 0.5 * ratio, rng),
            _ => swap_workers(&mut candidate, rng),
        }
        candidate
    }

    /// Refines `solution`, scoring candidates with `fitness`.
    ///
    /// # Errors
    /// [`ConfigError::InvalidParameter`] if the configuration is invalid.
    pub fn anneal<R, F>(
        &self,
        solution: &Solution,
        mut fitness: F,
        rng: &mut R,
    ) -> Result<AnnealingOutcome, ConfigError>
    where
        R: Rng,
        F: FnMut(&Solution) -> f64,
    {
        self.config.validate()?;
        let cfg = &self.config;

        let mut current = solution.clone();
        let mut current_fitness = fitness(&current);
        let mut best = current.clone();
        let mut best_fitness = current_fitness;

        let mut temperature = cfg.initial_temp;
        let mut iterations = 0;
        let mut accepted_worse = 0;
        let mut stale = 0;

        if current.is_empty() {
            return Ok(AnnealingOutcome {
                solution: best,
                fitness: best_fitness,
                iterations,
                accepted_worse,
                final_temperature: temperature,
            });
        }

        while iterations < cfg.max_iterations && temperature >= cfg.min_temp {
            iterations += 1;
            let ratio = temperature / cfg.initial_temp;

            let mut candidate: Option<(Solution, f64)> = None;
            for _ in 0..cfg.neighbors {
                let neighbor = self.neighbor(&current, ratio, rng);
                let f = fitness(&neighbor);
                if candidate.as_ref().map_or(true, |(_, best_f)| f < *best_f) {
                    candidate = Some((neighbor, f));
                }
            }

            let mut improved = false;
            if let Some((neighbor, f)) = candidate {
                let p = acceptance_probability(current_fitness, f, ratio);
                if p > rng.random::<f64>() {
                    if f > current_fitness {
                        accepted_worse += 1;
                    }
                    current = neighbor;
                    current_fitness = f;
                    if current_fitness < best_fitness {
                        best = current.clone();
                        best_fitness = current_fitness;
                        improved = true;
                    }
                }
            }

            temperature *= cfg.cooling_rate;
            if improved {
                stale = 0;
            } else {
                stale += 1;
                if stale >= cfg.patience {
                    break;
                }
            }
        }

        debug!(
            iterations,
            accepted_worse,
            final_temperature = temperature,
            best_fitness,
            "annealing finished"
        );

        Ok(AnnealingOutcome {
            solution: best,
            fitness: best_fitness,
            iterations,
            accepted_worse,
            final_temperature: temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::FitnessEvaluator;
    use crate::models::{Assignment, Task, Worker};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_problem() -> Problem {
        Problem::new(
            vec![
                Task::new("T1", 3.0).with_requirement("paint", 2.0),
                Task::new("T2", 2.0).with_dependency("T1"),
                Task::new("T3", 1.0),
            ],
            vec![
                Worker::new("W1").with_skill("paint", 3.0),
                Worker::new("W2"),
            ],
        )
        .unwrap()
    }

    fn poor_solution() -> Solution {
        Solution::new(vec![
            Assignment::new("T1", "W2", 0.0),
            Assignment::new("T2", "W2", 0.0),
            Assignment::new("T3", "W2", 0.0),
        ])
    }

    #[test]
    fn test_neighbor_weights() {
        assert_eq!(neighbor_weights(0.9), [0.4, 0.4, 0.2]);
        assert_eq!(neighbor_weights(0.5), [0.5, 0.4, 0.1]);
        assert_eq!(neighbor_weights(0.1), [0.3, 0.6, 0.1]);
    }

    #[test]
    fn test_acceptance_probability() {
        assert_eq!(acceptance_probability(10.0, 5.0, 0.5), 1.0);
        // 10% worse at ratio 1.0: exp(-1)
        let p = acceptance_probability(10.0, 11.0, 1.0);
        assert!((p - (-1.0f64).exp()).abs() < 1e-12);
        // Colder is stricter
        assert!(acceptance_probability(10.0, 11.0, 0.1) < p);
        // Undefined relative delta
        assert_eq!(acceptance_probability(0.0, 1.0, 1.0), 0.0);
        assert_eq!(acceptance_probability(f64::INFINITY, f64::INFINITY, 1.0), 0.0);
        assert_eq!(acceptance_probability(10.0, f64::INFINITY, 1.0), 0.0);
    }

    #[test]
    fn test_never_worse_than_input() {
        let p = sample_problem();
        let eval = FitnessEvaluator::new(&p);
        let start = poor_solution();
        let start_fitness = eval.evaluate(&start);

        for seed in 0..5 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let out = SimulatedAnnealing::new(&p)
                .anneal(&start, |s| eval.evaluate(s), &mut rng)
                .unwrap();
            assert!(out.fitness <= start_fitness);
            assert!((eval.evaluate(&out.solution) - out.fitness).abs() < 1e-9);
        }
    }

    #[test]
    fn test_improves_poor_solution() {
        let p = sample_problem();
        let eval = FitnessEvaluator::new(&p);
        let mut rng = SmallRng::seed_from_u64(42);
        let out = SimulatedAnnealing::new(&p)
            .anneal(&poor_solution(), |s| eval.evaluate(s), &mut rng)
            .unwrap();
        assert!(out.fitness < eval.evaluate(&poor_solution()));
        assert!(out.iterations >= 1);
    }

    #[test]
    fn test_stops_at_min_temp() {
        let p = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        // 10 → 5 → 2.5 → 1.25 → 0.625 (< 1.0)
        let config = AnnealingConfig::default()
            .with_initial_temp(10.0)
            .with_cooling_rate(0.5)
            .with_min_temp(1.0);
        let out = SimulatedAnnealing::new(&p)
            .with_config(config)
            .anneal(&poor_solution(), |_| 1.0, &mut rng)
            .unwrap();
        assert_eq!(out.iterations, 4);
        assert!(out.final_temperature < 1.0);
    }

    #[test]
    fn test_stops_on_patience() {
        let p = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let config = AnnealingConfig::default().with_max_iterations(1000);
        let out = SimulatedAnnealing::new(&p)
            .with_config(config)
            .anneal(&poor_solution(), |_| 1.0, &mut rng)
            .unwrap();
        assert_eq!(out.iterations, 50);
    }

    #[test]
    fn test_invalid_config() {
        let p = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let config = AnnealingConfig::default().with_cooling_rate(1.5);
        let result = SimulatedAnnealing::new(&p)
            .with_config(config)
            .anneal(&poor_solution(), |_| 1.0, &mut rng);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "cooling_rate", .. })
        ));
    }

    #[test]
    fn test_refinement_preset() {
        let c = AnnealingConfig::refinement();
        assert_eq!(c.max_iterations, 50);
        assert_eq!(c.initial_temp, 100.0);
        assert_eq!(c.cooling_rate, 0.90);
        assert!(c.validate().is_ok());
    }
}
