//! Island-model GA with ring migration.
//!
//! Several [`EvolutionEngine`]s evolve independently under different
//! parameters. Every `migration_interval` generations (including
//! generation 0), each island `i` sends copies of its `migration_size`
//! fittest individuals to island `(i + 1) mod N`, where they overwrite
//! that island's worst individuals.
//!
//! # Concurrency
//!
//! Islands step in parallel on rayon's pool; the end of each parallel step
//! is the generation barrier. Migration runs on the calling thread between
//! steps: all migrant batches are snapshotted before any island is
//! written. Each island owns a `SmallRng` seeded from the master seed, so
//! a fixed seed gives identical results with or without parallelism.
//!
//! # Reference
//! - Whitley, Rana & Heckendorn (1999), "The Island Model Genetic Algorithm"
//! - Alba & Tomassini (2002), "Parallelism and Evolutionary Algorithms"

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::engine::{EvolutionEngine, GenerationStats, IslandConfig};
use crate::error::ConfigError;
use crate::models::{Problem, Solution};

/// Island model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandModelConfig {
    /// One entry per island (default: [`IslandConfig::presets`]).
    pub islands: Vec<IslandConfig>,
    /// Generations to run (default: 100).
    pub generations: usize,
    /// Generations between migrations (default: 10).
    pub migration_interval: usize,
    /// Individuals sent per island per migration (default: 2).
    pub migration_size: usize,
    /// Master seed; `None` draws one at random.
    pub seed: Option<u64>,
    /// Step islands on the rayon pool (default: true).
    pub parallel: bool,
}

impl Default for IslandModelConfig {
    fn default() -> Self {
        Self {
            islands: IslandConfig::presets(),
            generations: 100,
            migration_interval: 10,
            migration_size: 2,
            seed: None,
            parallel: true,
        }
    }
}

impl IslandModelConfig {
    /// Replaces the island list.
    pub fn with_islands(mut self, islands: Vec<IslandConfig>) -> Self {
        self.islands = islands;
        self
    }

    /// Sets the generation count.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the migration interval.
    pub fn with_migration_interval(mut self, interval: usize) -> Self {
        self.migration_interval = interval;
        self
    }

    /// Sets the number of migrants per island.
    pub fn with_migration_size(mut self, size: usize) -> Self {
        self.migration_size = size;
        self
    }

    /// Fixes the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel island steps.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets every island's population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        for island in &mut self.islands {
            island.population_size = size;
        }
        self
    }

    /// Checks the model and every island.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.islands.is_empty() {
            return Err(ConfigError::invalid("islands", "at least one island is required"));
        }
        if self.migration_interval == 0 {
            return Err(ConfigError::invalid("migration_interval", "must be at least 1"));
        }
        for island in &self.islands {
            island.validate()?;
        }
        Ok(())
    }
}

/// Progress of one generation across all islands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation index (0-based).
    pub generation: usize,
    /// Statistics per island, in island order.
    pub islands: Vec<GenerationStats>,
    /// Global best fitness so far.
    pub best_fitness: f64,
    /// Whether migration ran after this generation.
    pub migrated: bool,
}

/// Result of an island model run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Best solution over all islands and generations.
    pub best_solution: Solution,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations completed.
    pub generations: usize,
    /// Whether the run ended on the stop flag.
    pub stopped: bool,
    /// One report per completed generation.
    pub history: Vec<GenerationReport>,
}

/// Island-model driver.
///
/// # Example
/// ```
/// use u_skillsched::ga::{IslandModel, IslandModelConfig};
/// use u_skillsched::models::{Problem, Task, Worker};
///
/// let problem = Problem::new(
///     vec![Task::new("T1", 2.0), Task::new("T2", 3.0).with_dependency("T1")],
///     vec![Worker::new("W1"), Worker::new("W2")],
/// ).unwrap();
/// let config = IslandModelConfig::default()
///     .with_generations(5)
///     .with_population_size(10)
///     .with_seed(42);
/// let result = IslandModel::new(problem, config).unwrap().run().unwrap();
/// assert_eq!(result.generations, 5);
/// assert_eq!(result.best_solution.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct IslandModel {
    problem: Arc<Problem>,
    config: IslandModelConfig,
}

impl IslandModel {
    /// Creates a model.
    ///
    /// # Errors
    /// Invalid configuration, or a problem without workers or tasks.
    pub fn new(problem: impl Into<Arc<Problem>>, config: IslandModelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let problem = problem.into();
        if problem.worker_count() == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if problem.task_count() == 0 {
            return Err(ConfigError::NoTasks);
        }
        Ok(Self { problem, config })
    }

    /// The model parameters.
    pub fn config(&self) -> &IslandModelConfig {
        &self.config
    }

    /// The shared problem.
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Runs every generation.
    pub fn run(&self) -> Result<RunResult, ConfigError> {
        self.run_with(|_| {}, None)
    }

    /// Runs with a per-generation callback and an optional stop flag.
    ///
    /// Islands are initialized up front. The flag is checked once per
    /// generation before the islands step; a raised flag ends the run with
    /// the best solution found so far, which is at least the best initial
    /// individual.
    pub fn run_with<F>(&self, mut on_generation: F, stop: Option<&AtomicBool>) -> Result<RunResult, ConfigError>
    where
        F: FnMut(&GenerationReport),
    {
        let cfg = &self.config;
        let seed = cfg.seed.unwrap_or_else(rand::random);
        let mut master = SmallRng::seed_from_u64(seed);

        let mut islands = cfg
            .islands
            .iter()
            .map(|island| {
                let island = island.clone().with_generations(cfg.generations);
                EvolutionEngine::new(Arc::clone(&self.problem), island, master.random())
            })
            .collect::<Result<Vec<_>, _>>()?;
        for engine in &mut islands {
            engine.initialize()?;
        }

        info!(
            islands = islands.len(),
            generations = cfg.generations,
            tasks = self.problem.task_count(),
            workers = self.problem.worker_count(),
            seed,
            "starting island model"
        );

        let mut best: Option<(Solution, f64)> = None;
        let mut history = Vec::with_capacity(cfg.generations);
        let mut stopped = false;

        for generation in 0..cfg.generations {
            if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                info!(generation, "stop requested");
                stopped = true;
                break;
            }

            let stats = if cfg.parallel {
                islands
                    .par_iter_mut()
                    .map(|engine| engine.step(generation))
                    .collect::<Result<Vec<_>, _>>()?
            } else {
                islands
                    .iter_mut()
                    .map(|engine| engine.step(generation))
                    .collect::<Result<Vec<_>, _>>()?
            };

            for (i, (engine, s)) in islands.iter().zip(&stats).enumerate() {
                debug!(
                    generation,
                    island = i,
                    best = s.best,
                    average = s.average,
                    "island generation"
                );
                if update_best(&mut best, engine) {
                    info!(generation, island = i, fitness = engine.best_fitness(), "new global best");
                }
            }

            let migrated = generation % cfg.migration_interval == 0;
            if migrated {
                migrate(&mut islands, cfg.migration_size);
                debug!(generation, size = cfg.migration_size, "migration");
            }

            let report = GenerationReport {
                generation,
                islands: stats,
                best_fitness: best.as_ref().map_or(f64::INFINITY, |(_, f)| *f),
                migrated,
            };
            on_generation(&report);
            history.push(report);
        }

        // Fold in the last offspring, which no step has scored yet.
        for engine in &mut islands {
            engine.evaluate();
            update_best(&mut best, engine);
        }

        let (best_solution, best_fitness) =
            best.unwrap_or_else(|| (Solution::default(), f64::INFINITY));
        info!(
            best_fitness,
            generations = history.len(),
            stopped,
            "island model finished"
        );

        Ok(RunResult {
            best_solution,
            best_fitness,
            generations: history.len(),
            stopped,
            history,
        })
    }
}

/// Adopts the island's best if it strictly beats the global best.
fn update_best(best: &mut Option<(Solution, f64)>, engine: &EvolutionEngine) -> bool {
    let Some((solution, fitness)) = engine.best() else {
        return false;
    };
    let current = best.as_ref().map_or(f64::INFINITY, |(_, f)| *f);
    if fitness < current {
        *best = Some((solution.clone(), fitness));
        true
    } else {
        false
    }
}

/// Ring migration: island `i` sends its elite to island `(i + 1) mod N`.
///
/// Every batch is copied out before any island is modified.
pub(crate) fn migrate(islands: &mut [EvolutionEngine], size: usize) {
    let n = islands.len();
    if n < 2 || size == 0 {
        return;
    }
    let batches: Vec<Vec<Solution>> = islands.iter_mut().map(|e| e.elite(size)).collect();
    for (source, batch) in batches.into_iter().enumerate() {
        islands[(source + 1) % n].replace_worst(batch);
    }
}
