//! Genetic search for skill-constrained task scheduling.
//!
//! A [`Solution`](crate::models::Solution) is a positional chromosome: one
//! `(task, worker, start)` gene per task. Infeasibility is never rejected
//! outright; the [`FitnessEvaluator`] prices it, and the operators here
//! move through feasible and infeasible space alike.
//!
//! # Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`fitness`] | weighted multi-objective penalty |
//! | [`init`] | five population initialization strategies |
//! | [`selection`] | tournament and roulette-wheel selection |
//! | [`crossover`] | single-point, two-point, uniform |
//! | [`mutation`] | temperature-weighted gene moves |
//! | [`local_search`] | first-improvement hill climbing |
//! | [`annealing`] | simulated annealing refinement |
//! | [`engine`] | one population's generational loop |
//! | [`island`] | parallel islands with ring migration |
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"
//! - Talbi (2009), "Metaheuristics: From Design to Implementation"

pub mod annealing;
mod cache;
mod chromosome;
pub mod crossover;
pub mod engine;
pub mod fitness;
pub mod init;
pub mod island;
pub mod local_search;
pub mod mutation;
pub mod selection;

pub use annealing::{AnnealingConfig, AnnealingOutcome, SimulatedAnnealing};
pub use cache::FitnessCache;
pub use chromosome::{adjust_start, reassign_qualified, reassign_random, shift_block, swap_workers};
pub use crossover::{crossover, CrossoverStrategy};
pub use engine::{EvolutionEngine, EvolutionResult, GenerationStats, IslandConfig};
pub use fitness::{FitnessBreakdown, FitnessEvaluator, FitnessWeights};
pub use init::{InitStrategy, PopulationInitializer};
pub use island::{GenerationReport, IslandModel, IslandModelConfig, RunResult};
pub use local_search::{LocalSearch, LocalSearchConfig, LocalSearchOutcome};
pub use mutation::{MutationContext, MutationOperator, Mutator};
pub use selection::SelectionStrategy;
