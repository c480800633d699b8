//! Positional crossover operators.
//!
//! Parents are aligned by locus and exchange whole genes. A child is only
//! a valid schedule when both parents list tasks in the same order; the
//! fitness function prices any resulting duplicates as `+∞`, so selection
//! weeds them out.
//!
//! # Usage
//!
//! ```
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//! use u_skillsched::ga::{crossover, CrossoverStrategy};
//! use u_skillsched::models::{Assignment, Solution};
//!
//! let p1 = Solution::new(vec![
//!     Assignment::new("T1", "W1", 0.0),
//!     Assignment::new("T2", "W1", 1.0),
//! ]);
//! let p2 = Solution::new(vec![
//!     Assignment::new("T1", "W2", 0.0),
//!     Assignment::new("T2", "W2", 1.0),
//! ]);
//! let mut rng = SmallRng::seed_from_u64(42);
//! let (c1, c2) = crossover(CrossoverStrategy::SinglePoint, &p1, &p2, &mut rng).unwrap();
//! assert_eq!(c1.worker_for("T2"), Some("W2"));
//! assert_eq!(c2.worker_for("T2"), Some("W1"));
//! ```

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Solution;

/// Crossover strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrossoverStrategy {
    /// One cut in `[1, len−1]`; tails are exchanged.
    #[default]
    SinglePoint,
    /// Cuts `p1 ∈ [1, len−2]`, `p2 ∈ [p1+1, len−1]`; middles are exchanged.
    TwoPoint,
    /// Each locus is exchanged independently.
    Uniform {
        /// Per-locus exchange probability.
        swap_probability: f64,
    },
}

impl CrossoverStrategy {
    /// Uniform crossover with an even exchange probability.
    pub fn uniform() -> Self {
        Self::Uniform {
            swap_probability: 0.5,
        }
    }

    /// Checks the strategy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            CrossoverStrategy::Uniform { swap_probability } => {
                crate::error::check_probability("swap_probability", swap_probability)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for CrossoverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossoverStrategy::SinglePoint => f.write_str("single_point"),
            CrossoverStrategy::TwoPoint => f.write_str("two_point"),
            CrossoverStrategy::Uniform { swap_probability } => {
                write!(f, "uniform({swap_probability})")
            }
        }
    }
}

impl FromStr for CrossoverStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single_point" | "single" => Ok(Self::SinglePoint),
            "two_point" | "two" => Ok(Self::TwoPoint),
            "uniform" => Ok(Self::uniform()),
            _ => Err(ConfigError::UnknownCrossoverStrategy(s.to_string())),
        }
    }
}

/// Recombines two parents with the given strategy.
///
/// Children start as clones of their parents; when the solution is too short
/// for the strategy's cut points they are returned unchanged.
///
/// # Errors
/// - [`ConfigError::EmptySolution`] if either parent is empty.
/// - [`ConfigError::LengthMismatch`] if the parents differ in length.
pub fn crossover<R: Rng>(
    strategy: CrossoverStrategy,
    p1: &Solution,
    p2: &Solution,
    rng: &mut R,
) -> Result<(Solution, Solution), ConfigError> {
    if p1.is_empty() || p2.is_empty() {
        return Err(ConfigError::EmptySolution("crossover"));
    }
    if p1.len() != p2.len() {
        return Err(ConfigError::LengthMismatch {
            left: p1.len(),
            right: p2.len(),
        });
    }

    let mut c1 = p1.clone();
    let mut c2 = p2.clone();
    match strategy {
        CrossoverStrategy::SinglePoint => single_point(&mut c1, &mut c2, rng),
        CrossoverStrategy::TwoPoint => two_point(&mut c1, &mut c2, rng),
        CrossoverStrategy::Uniform { swap_probability } => {
            uniform(&mut c1, &mut c2, swap_probability, rng)
        }
    }
    Ok((c1, c2))
}

fn swap_range(c1: &mut Solution, c2: &mut Solution, range: std::ops::Range<usize>) {
    c1.assignments[range.clone()].swap_with_slice(&mut c2.assignments[range]);
}

fn single_point<R: Rng>(c1: &mut Solution, c2: &mut Solution, rng: &mut R) {
    let len = c1.len();
    if len <= 1 {
        return;
    }
    let cut = rng.random_range(1..len);
    swap_range(c1, c2, cut..len);
}

fn two_point<R: Rng>(c1: &mut Solution, c2: &mut Solution, rng: &mut R) {
    let len = c1.len();
    if len <= 2 {
        return;
    }
    let first = rng.random_range(1..=len - 2);
    let second = rng.random_range(first + 1..=len - 1);
    swap_range(c1, c2, first..second);
}

fn uniform<R: Rng>(c1: &mut Solution, c2: &mut Solution, swap_probability: f64, rng: &mut R) {
    for (a, b) in c1.assignments.iter_mut().zip(c2.assignments.iter_mut()) {
        if rng.random::<f64>() < swap_probability {
            std::mem::swap(a, b);
        }
    }
}
