//! Parent selection.
//!
//! Both strategies work on a precomputed fitness slice (lower = better) and
//! return an index into it.
//!
//! - **Tournament**: sample `k` distinct individuals, keep the fittest.
//! - **Roulette wheel**: min-max normalize, invert so the best gets the
//!   largest slice (`1.1 − normalized`, so the worst still gets 0.1), then
//!   spin. Degenerate inputs fall back to tournament.
//!
//! # Reference
//! Goldberg & Deb (1991), "A comparative analysis of selection schemes used
//! in genetic algorithms"

use std::fmt;
use std::str::FromStr;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default tournament size.
pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;

/// Tolerance on the sum of roulette probabilities.
const PROBABILITY_TOLERANCE: f64 = 1e-4;

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Best of `size` distinct random individuals.
    Tournament {
        /// Number of competitors (capped at the population size).
        size: usize,
    },
    /// Fitness-proportional selection on inverted, normalized fitness.
    RouletteWheel,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::Tournament {
            size: DEFAULT_TOURNAMENT_SIZE,
        }
    }
}

impl SelectionStrategy {
    /// Selects one index from `fitness`.
    ///
    /// Returns `None` only for an empty slice.
    pub fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> Option<usize> {
        match *self {
            SelectionStrategy::Tournament { size } => tournament_select(fitness, size, rng),
            SelectionStrategy::RouletteWheel => roulette_select(fitness, rng),
        }
    }

    /// Checks the strategy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            SelectionStrategy::Tournament { size: 0 } => {
                Err(ConfigError::invalid("tournament size", "must be at least 1"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::Tournament { size } => write!(f, "tournament({size})"),
            SelectionStrategy::RouletteWheel => f.write_str("roulette_wheel"),
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tournament" => Ok(Self::default()),
            "roulette" | "roulette_wheel" => Ok(Self::RouletteWheel),
            _ => Err(ConfigError::UnknownSelectionStrategy(s.to_string())),
        }
    }
}

/// Tournament selection: the fittest of `size` distinct random indices.
///
/// The tournament shrinks to the population size when the population is
/// smaller; ties go to the first sampled competitor.
pub fn tournament_select<R: Rng>(fitness: &[f64], size: usize, rng: &mut R) -> Option<usize> {
    let n = fitness.len();
    if n == 0 {
        return None;
    }
    let k = size.clamp(1, n);

    let mut best: Option<usize> = None;
    for i in index::sample(rng, n, k) {
        match best {
            Some(b) if fitness[i] >= fitness[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Roulette-wheel selection for minimization.
///
/// Equal fitness everywhere yields a uniform pick. Non-finite or otherwise
/// unusable probabilities fall back to [`tournament_select`].
pub fn roulette_select<R: Rng>(fitness: &[f64], rng: &mut R) -> Option<usize> {
    let n = fitness.len();
    if n == 0 {
        return None;
    }

    let min = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    let max = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return Some(rng.random_range(0..n));
    }

    match roulette_probabilities(fitness, min, max) {
        Some(probabilities) => match WeightedIndex::new(&probabilities) {
            Ok(wheel) => Some(wheel.sample(rng)),
            Err(_) => tournament_select(fitness, DEFAULT_TOURNAMENT_SIZE, rng),
        },
        None => tournament_select(fitness, DEFAULT_TOURNAMENT_SIZE, rng),
    }
}

fn roulette_probabilities(fitness: &[f64], min: f64, max: f64) -> Option<Vec<f64>> {
    let span = max - min;
    let inverted: Vec<f64> = fitness.iter().map(|f| 1.1 - (f - min) / span).collect();
    let total: f64 = inverted.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let probabilities: Vec<f64> = inverted.iter().map(|v| v / total).collect();
    let valid = probabilities
        .iter()
        .all(|p| p.is_finite() && (0.0..=1.0).contains(p));
    let sum: f64 = probabilities.iter().sum();
    if !valid || (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return None;
    }
    Some(probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_tournament_single_individual() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert_eq!(tournament_select(&[5.0], 3, &mut rng), Some(0));
    }

    #[test]
    fn test_tournament_empty() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert_eq!(tournament_select(&[], 3, &mut rng), None);
        assert_eq!(roulette_select(&[], &mut rng), None);
    }

    #[test]
    fn test_tournament_full_size_finds_best() {
        let mut rng = SmallRng::seed_from_u64(42);
        let fitness = [9.0, 3.0, 7.0, 1.0, 5.0];
        for _ in 0..20 {
            assert_eq!(tournament_select(&fitness, 5, &mut rng), Some(3));
        }
    }

    #[test]
    fn test_tournament_never_picks_worst_with_two_competitors() {
        let mut rng = SmallRng::seed_from_u64(42);
        let fitness = [1.0, 2.0, 3.0];
        for _ in 0..50 {
            assert_ne!(tournament_select(&fitness, 2, &mut rng), Some(2));
        }
    }

    #[test]
    fn test_roulette_favors_better() {
        let mut rng = SmallRng::seed_from_u64(42);
        let fitness = [1.0, 100.0];
        let mut counts = [0usize; 2];
        for _ in 0..2000 {
            counts[roulette_select(&fitness, &mut rng).unwrap()] += 1;
        }
        // weights 1.1 vs 0.1
        assert!(counts[0] > counts[1] * 4);
        assert!(counts[1] > 0);
    }

    #[test]
    fn test_roulette_equal_fitness_uniform() {
        let mut rng = SmallRng::seed_from_u64(42);
        let fitness = [4.0; 4];
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[roulette_select(&fitness, &mut rng).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_roulette_infinite_falls_back() {
        let mut rng = SmallRng::seed_from_u64(42);
        let fitness = [2.0, f64::INFINITY, 1.0];
        for _ in 0..50 {
            let idx = roulette_select(&fitness, &mut rng).unwrap();
            assert!(idx < 3);
        }
    }

    #[test]
    fn test_strategy_parse_and_validate() {
        assert_eq!(
            "tournament".parse::<SelectionStrategy>().unwrap(),
            SelectionStrategy::Tournament { size: 3 }
        );
        assert_eq!(
            "roulette".parse::<SelectionStrategy>().unwrap(),
            SelectionStrategy::RouletteWheel
        );
        assert!("rank".parse::<SelectionStrategy>().is_err());
        assert!(SelectionStrategy::Tournament { size: 0 }.validate().is_err());

        let json = serde_json::to_string(&SelectionStrategy::default()).unwrap();
        assert_eq!(json, r#"{"type":"tournament","size":3}"#);
    }
}
