//! Fitness memoization.
//!
//! Keys are whole solutions compared exactly (task, worker, and start-time
//! bits per locus), so a cached value is only reused for an identical
//! gene sequence. Entries live until [`FitnessCache::clear`].

use std::collections::HashMap;

use super::FitnessEvaluator;
use crate::models::Solution;

/// Exact-match fitness cache with hit/miss counters.
#[derive(Debug, Clone, Default)]
pub struct FitnessCache {
    entries: HashMap<Solution, f64>,
    hits: u64,
    misses: u64,
}

impl FitnessCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached fitness of `solution`, computing it on a miss.
    pub fn get_or_evaluate(&mut self, solution: &Solution, evaluator: &FitnessEvaluator<'_>) -> f64 {
        if let Some(&fitness) = self.entries.get(solution) {
            self.hits += 1;
            return fitness;
        }
        self.misses += 1;
        let fitness = evaluator.evaluate(solution);
        self.entries.insert(solution.clone(), fitness);
        fitness
    }

    /// Cached fitness, if present.
    pub fn get(&self, solution: &Solution) -> Option<f64> {
        self.entries.get(solution).copied()
    }

    /// Number of cached solutions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that required an evaluation.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
