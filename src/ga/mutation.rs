//! Temperature-controlled mutation.
//!
//! A mutation applies `max(1, round(len · 0.1 · ratio))` gene moves, each
//! drawn from four operators with weights that depend only on the
//! temperature ratio `ratio ∈ [0, 1]`:
//!
//! | ratio | reassign | adjust time | swap | shift |
//! |-------|----------|-------------|------|-------|
//! | `> 0.7` | 0.4 | 0.3 | 0.2 | 0.1 |
//! | `> 0.3` | 0.5 | 0.3 | 0.1 | 0.1 |
//! | otherwise | 0.6 | 0.3 | 0.1 | 0.0 |
//!
//! Hot mutations explore (more swaps and block shifts); cold mutations
//! mostly fix worker choices and nudge start times.

use std::fmt;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use tracing::trace;

use super::chromosome::{adjust_start, reassign_qualified, shift_block, swap_workers};
use crate::error::ConfigError;
use crate::models::{Problem, Solution};

/// Share of genes touched per mutation at full temperature.
const MUTATION_DENSITY: f64 = 0.1;

/// Gene move chosen by a mutation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperator {
    /// New worker among those naming every required skill.
    Reassign,
    /// Start time moved by up to `0.5 · duration · ratio`.
    AdjustTime,
    /// Two loci exchange workers.
    Swap,
    /// A short run of loci shares a time offset.
    Shift,
}

impl MutationOperator {
    /// Operators in weight order.
    pub const ALL: [MutationOperator; 4] = [
        MutationOperator::Reassign,
        MutationOperator::AdjustTime,
        MutationOperator::Swap,
        MutationOperator::Shift,
    ];
}

impl fmt::Display for MutationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationOperator::Reassign => "reassign",
            MutationOperator::AdjustTime => "adjust_time",
            MutationOperator::Swap => "swap",
            MutationOperator::Shift => "shift",
        };
        f.write_str(name)
    }
}

/// Operator weights for a temperature ratio, in [`MutationOperator::ALL`] order.
pub fn operator_weights(temperature_ratio: f64) -> [f64; 4] {
    if temperature_ratio > 0.7 {
        [0.4, 0.3, 0.2, 0.1]
    } else if temperature_ratio > 0.3 {
        [0.5, 0.3, 0.1, 0.1]
    } else {
        [0.6, 0.3, 0.1, 0.0]
    }
}

/// Number of gene moves for a solution of `len` genes.
pub fn mutation_count(len: usize, temperature_ratio: f64) -> usize {
    ((len as f64 * MUTATION_DENSITY * temperature_ratio).round() as usize).max(1)
}

/// Search progress passed to a mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationContext {
    /// Current generation, if known.
    pub generation: Option<usize>,
    /// Generation budget.
    pub max_generations: usize,
    /// Temperature ratio in `[0, 1]` (1 = hottest).
    pub temperature_ratio: f64,
}

impl Default for MutationContext {
    fn default() -> Self {
        Self {
            generation: None,
            max_generations: 100,
            temperature_ratio: 1.0,
        }
    }
}

impl MutationContext {
    /// Context at a given generation.
    pub fn at(generation: usize, max_generations: usize, temperature_ratio: f64) -> Self {
        Self {
            generation: Some(generation),
            max_generations,
            temperature_ratio,
        }
    }

    /// Fraction of the generation budget already spent, if known.
    pub fn progress(&self) -> Option<f64> {
        self.generation
            .map(|g| g as f64 / self.max_generations.max(1) as f64)
    }

    fn clamped_ratio(&self) -> f64 {
        if self.temperature_ratio.is_nan() {
            1.0
        } else {
            self.temperature_ratio.clamp(0.0, 1.0)
        }
    }
}

/// Mutation operator bound to a problem.
#[derive(Debug, Clone, Copy)]
pub struct Mutator<'p> {
    problem: &'p Problem,
}

impl<'p> Mutator<'p> {
    /// Creates a mutator.
    pub fn new(problem: &'p Problem) -> Self {
        Self { problem }
    }

    /// Returns a mutated copy of `solution`.
    ///
    /// # Errors
    /// [`ConfigError::EmptySolution`] for an empty solution.
    pub fn mutate<R: Rng>(
        &self,
        solution: &Solution,
        context: MutationContext,
        rng: &mut R,
    ) -> Result<Solution, ConfigError> {
        if solution.is_empty() {
            return Err(ConfigError::EmptySolution("mutation"));
        }

        let ratio = context.clamped_ratio();
        let weights = operator_weights(ratio);
        let wheel = WeightedIndex::new(weights)
            .map_err(|e| ConfigError::invalid("mutation weights", e.to_string()))?;

        let mut mutated = solution.clone();
        let count = mutation_count(mutated.len(), ratio);
        trace!(
            generation = ?context.generation,
            progress = ?context.progress(),
            ratio,
            count,
            "mutating solution"
        );

        for _ in 0..count {
            let operator = MutationOperator::ALL[wheel.sample(rng)];
            trace!(%operator, "mutation step");
            self.apply(&mut mutated, operator, ratio, rng);
        }
        Ok(mutated)
    }

    fn apply<R: Rng>(
        &self,
        solution: &mut Solution,
        operator: MutationOperator,
        ratio: f64,
        rng: &mut R,
    ) {
        let len = solution.len();
        match operator {
            MutationOperator::Reassign => {
                let idx = rng.random_range(0..len);
                reassign_qualified(solution, idx, self.problem, rng);
            }
            MutationOperator::AdjustTime => {
                let idx = rng.random_range(0..len);
                adjust_start(solution, idx, self.problem, 0.5 * ratio, rng);
            }
            MutationOperator::Swap => swap_workers(solution, rng),
            MutationOperator::Shift => shift_block(solution, ratio, rng),
        }
    }
}
