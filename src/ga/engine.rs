//! Single-population evolution engine.
//!
//! One engine is one island: it owns its population, fitness cache, and
//! seeded RNG, and shares the [`Problem`] read-only through an [`Arc`].
//!
//! # Generation
//!
//! 1. **Evaluate**: score every individual (through the cache) and update
//!    the running best.
//! 2. **Reproduce**: until the next population is full, select two parents;
//!    with `crossover_rate` recombine them (and with `local_search_rate`
//!    polish both children by local search), else clone them; then mutate
//!    each child independently with `mutation_rate`.
//! 3. **Refine** (optional): anneal the generation's best offspring and, if
//!    that beats it, overwrite the worst member of the new population.
//!
//! Only population members and kept offspring go through the cache. Local
//! search and annealing neighbours are scored directly.
//!
//! # Reference
//! - Holland (1975), "Adaptation in Natural and Artificial Systems"
//! - Talbi (2002), "A Taxonomy of Hybrid Metaheuristics"

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::annealing::{AnnealingConfig, SimulatedAnnealing};
use super::cache::FitnessCache;
use super::crossover::{crossover, CrossoverStrategy};
use super::fitness::{FitnessEvaluator, FitnessWeights};
use super::init::{InitStrategy, PopulationInitializer};
use super::local_search::{LocalSearch, LocalSearchConfig};
use super::mutation::{MutationContext, Mutator};
use super::selection::SelectionStrategy;
use crate::error::{check_probability, ConfigError};
use crate::models::{Problem, Solution};

/// Parameters of one island.
///
/// # Example
/// ```
/// use u_skillsched::ga::{CrossoverStrategy, InitStrategy, IslandConfig};
///
/// let config = IslandConfig::default()
///     .with_population_size(30)
///     .with_mutation_rate(0.2)
///     .with_init_strategy(InitStrategy::Intelligent)
///     .with_crossover(CrossoverStrategy::TwoPoint);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    /// Individuals per generation (default: 50).
    pub population_size: usize,
    /// Generation budget for standalone runs and mutation progress (default: 100).
    pub generations: usize,
    /// Per-child mutation probability (default: 0.1).
    pub mutation_rate: f64,
    /// Per-pair crossover probability (default: 0.8).
    pub crossover_rate: f64,
    /// How the first population is built (default: `Hybrid`).
    pub init_strategy: InitStrategy,
    /// Crossover operator (default: single-point).
    pub crossover: CrossoverStrategy,
    /// Parent selection (default: tournament of 3).
    pub selection: SelectionStrategy,
    /// Anneal each generation's best offspring (default: false).
    pub use_annealing: bool,
    /// Probability of polishing a crossover pair by local search (default: 0.4).
    pub local_search_rate: f64,
    /// Local search parameters for offspring polish.
    pub local_search: LocalSearchConfig,
    /// Annealing parameters for the refinement step.
    pub annealing: AnnealingConfig,
    /// Fitness term weights.
    pub weights: FitnessWeights,
    /// Cool the mutation temperature linearly over the generation budget
    /// (default: false, constant ratio 1.0).
    pub adaptive_mutation: bool,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            init_strategy: InitStrategy::Hybrid,
            crossover: CrossoverStrategy::SinglePoint,
            selection: SelectionStrategy::default(),
            use_annealing: false,
            local_search_rate: 0.4,
            local_search: LocalSearchConfig::offspring_polish(),
            annealing: AnnealingConfig::refinement(),
            weights: FitnessWeights::default(),
            adaptive_mutation: false,
        }
    }
}

impl IslandConfig {
    /// The four heterogeneous islands of the default island model.
    ///
    /// | # | mutation | crossover | init | operator | SA |
    /// |---|----------|-----------|------|----------|----|
    /// | 0 | 0.10 | 0.8 | Intelligent | single-point | yes |
    /// | 1 | 0.20 | 0.6 | Intelligent | two-point | no |
    /// | 2 | 0.05 | 0.9 | Hybrid | single-point | no |
    /// | 3 | 0.10 | 0.8 | Hybrid | single-point | yes |
    pub fn presets() -> Vec<IslandConfig> {
        vec![
            Self::default()
                .with_mutation_rate(0.1)
                .with_crossover_rate(0.8)
                .with_init_strategy(InitStrategy::Intelligent)
                .with_annealing(true),
            Self::default()
                .with_mutation_rate(0.2)
                .with_crossover_rate(0.6)
                .with_init_strategy(InitStrategy::Intelligent)
                .with_crossover(CrossoverStrategy::TwoPoint),
            Self::default()
                .with_mutation_rate(0.05)
                .with_crossover_rate(0.9)
                .with_init_strategy(InitStrategy::Hybrid),
            Self::default()
                .with_mutation_rate(0.1)
                .with_crossover_rate(0.8)
                .with_init_strategy(InitStrategy::Hybrid)
                .with_annealing(true),
        ]
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the initialization strategy.
    pub fn with_init_strategy(mut self, strategy: InitStrategy) -> Self {
        self.init_strategy = strategy;
        self
    }

    /// Sets the crossover operator.
    pub fn with_crossover(mut self, strategy: CrossoverStrategy) -> Self {
        self.crossover = strategy;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, strategy: SelectionStrategy) -> Self {
        self.selection = strategy;
        self
    }

    /// Enables or disables annealing refinement.
    pub fn with_annealing(mut self, enabled: bool) -> Self {
        self.use_annealing = enabled;
        self
    }

    /// Sets the local search probability.
    pub fn with_local_search_rate(mut self, rate: f64) -> Self {
        self.local_search_rate = rate;
        self
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Enables or disables the mutation cooling schedule.
    pub fn with_adaptive_mutation(mut self, enabled: bool) -> Self {
        self.adaptive_mutation = enabled;
        self
    }

    /// Checks every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::invalid("population_size", "must be at least 1"));
        }
        check_probability("mutation_rate", self.mutation_rate)?;
        check_probability("crossover_rate", self.crossover_rate)?;
        check_probability("local_search_rate", self.local_search_rate)?;
        self.crossover.validate()?;
        self.selection.validate()?;
        self.local_search.validate()?;
        if self.use_annealing {
            self.annealing.validate()?;
        }
        Ok(())
    }

    /// Mutation temperature ratio at a generation.
    pub fn temperature_ratio(&self, generation: usize) -> f64 {
        if !self.adaptive_mutation || self.generations == 0 {
            return 1.0;
        }
        (1.0 - generation as f64 / self.generations as f64).clamp(0.0, 1.0)
    }
}

/// Fitness summary of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index (0-based).
    pub generation: usize,
    /// Lowest fitness in the evaluated population.
    pub best: f64,
    /// Mean fitness of the evaluated population.
    pub average: f64,
    /// Every individual's fitness, in population order.
    pub fitness: Vec<f64>,
}

/// Result of a standalone run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Best solution seen.
    pub best_solution: Solution,
    /// Its fitness.
    pub best_fitness: f64,
    /// One entry per generation.
    pub history: Vec<GenerationStats>,
}

/// Genetic algorithm over one population.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use u_skillsched::ga::{EvolutionEngine, IslandConfig};
/// use u_skillsched::models::{Problem, Task, Worker};
///
/// let problem = Arc::new(Problem::new(
///     vec![Task::new("T1", 2.0), Task::new("T2", 1.0).with_dependency("T1")],
///     vec![Worker::new("W1"), Worker::new("W2")],
/// ).unwrap());
/// let config = IslandConfig::default().with_population_size(10).with_generations(5);
/// let mut engine = EvolutionEngine::new(problem, config, 42).unwrap();
/// let result = engine.run().unwrap();
/// assert_eq!(result.history.len(), 5);
/// assert!(result.best_fitness.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    problem: Arc<Problem>,
    config: IslandConfig,
    population: Vec<Solution>,
    cache: FitnessCache,
    best: Option<(Solution, f64)>,
    history: Vec<GenerationStats>,
    rng: SmallRng,
}

impl EvolutionEngine {
    /// Creates an engine with a seeded RNG. The population is built lazily.
    ///
    /// # Errors
    /// Invalid configuration, or a problem without workers or tasks.
    pub fn new(problem: Arc<Problem>, config: IslandConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        PopulationInitializer::new(&problem, config.init_strategy)?;
        Ok(Self {
            problem,
            config,
            population: Vec::new(),
            cache: FitnessCache::new(),
            best: None,
            history: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// The island parameters.
    pub fn config(&self) -> &IslandConfig {
        &self.config
    }

    /// The shared problem.
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Current population.
    pub fn population(&self) -> &[Solution] {
        &self.population
    }

    /// Best solution seen so far and its fitness.
    pub fn best(&self) -> Option<(&Solution, f64)> {
        self.best.as_ref().map(|(s, f)| (s, *f))
    }

    /// Best fitness seen so far (`+∞` before the first evaluation).
    pub fn best_fitness(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |(_, f)| *f)
    }

    /// Per-generation statistics so far.
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// The fitness cache.
    pub fn cache(&self) -> &FitnessCache {
        &self.cache
    }

    /// Empties the fitness cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Builds a fresh population with the configured strategy.
    pub fn initialize(&mut self) -> Result<(), ConfigError> {
        let init = PopulationInitializer::new(&self.problem, self.config.init_strategy)?;
        self.population = init.create_population(self.config.population_size, &mut self.rng);
        Ok(())
    }

    /// Scores the current population and updates the running best.
    pub fn evaluate(&mut self) -> Vec<f64> {
        let problem = Arc::clone(&self.problem);
        let eval = FitnessEvaluator::new(&problem).with_weights(self.config.weights);

        let fitness: Vec<f64> = self
            .population
            .iter()
            .map(|s| self.cache.get_or_evaluate(s, &eval))
            .collect();

        for (solution, &f) in self.population.iter().zip(&fitness) {
            if f < self.best_fitness() {
                self.best = Some((solution.clone(), f));
            }
        }
        fitness
    }

    /// Runs one generation: evaluate, reproduce, optionally refine.
    ///
    /// Initializes the population first if it is empty.
    pub fn step(&mut self, generation: usize) -> Result<GenerationStats, ConfigError> {
        if self.population.is_empty() {
            self.initialize()?;
        }

        let fitness = self.evaluate();
        let best = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let average = fitness.iter().sum::<f64>() / fitness.len() as f64;
        trace!(generation, best, average, "generation evaluated");

        self.population = self.reproduce(&fitness, generation)?;

        let stats = GenerationStats {
            generation,
            best,
            average,
            fitness,
        };
        self.history.push(stats.clone());
        Ok(stats)
    }

    fn reproduce(&mut self, fitness: &[f64], generation: usize) -> Result<Vec<Solution>, ConfigError> {
        let problem = Arc::clone(&self.problem);
        let config = &self.config;
        let cache = &mut self.cache;
        let rng = &mut self.rng;
        let parents = &self.population;

        let eval = FitnessEvaluator::new(&problem).with_weights(config.weights);
        let local_search = LocalSearch::new(&problem).with_config(config.local_search);
        let mutator = Mutator::new(&problem);
        let context = MutationContext::at(
            generation,
            config.generations,
            config.temperature_ratio(generation),
        );

        let size = config.population_size;
        let mut next: Vec<Solution> = Vec::with_capacity(size);
        let mut generation_best: Option<(Solution, f64)> = None;

        while next.len() < size {
            let i = config
                .selection
                .select(fitness, rng)
                .ok_or(ConfigError::EmptyPopulation)?;
            let j = config
                .selection
                .select(fitness, rng)
                .ok_or(ConfigError::EmptyPopulation)?;

            let (mut c1, mut c2) = if rng.random::<f64>() < config.crossover_rate {
                let (a, b) = crossover(config.crossover, &parents[i], &parents[j], rng)?;
                if rng.random::<f64>() < config.local_search_rate {
                    let a = local_search.improve(&a, |s| eval.evaluate(s), rng);
                    let b = local_search.improve(&b, |s| eval.evaluate(s), rng);
                    (a.solution, b.solution)
                } else {
                    (a, b)
                }
            } else {
                (parents[i].clone(), parents[j].clone())
            };

            if rng.random::<f64>() < config.mutation_rate {
                c1 = mutator.mutate(&c1, context, rng)?;
            }
            if rng.random::<f64>() < config.mutation_rate {
                c2 = mutator.mutate(&c2, context, rng)?;
            }

            // A second child past the size cap is dropped unscored.
            for child in [c1, c2] {
                if next.len() >= size {
                    break;
                }
                let f = cache.get_or_evaluate(&child, &eval);
                if generation_best.as_ref().map_or(true, |(_, bf)| f < *bf) {
                    generation_best = Some((child.clone(), f));
                }
                next.push(child);
            }
        }

        if config.use_annealing {
            if let Some((candidate, candidate_fitness)) = generation_best {
                let outcome = SimulatedAnnealing::new(&problem)
                    .with_config(config.annealing)
                    .anneal(&candidate, |s| eval.evaluate(s), rng)?;

                if outcome.fitness < candidate_fitness {
                    let worst = next
                        .iter()
                        .enumerate()
                        .map(|(idx, s)| (idx, cache.get_or_evaluate(s, &eval)))
                        .fold(None, |acc: Option<(usize, f64)>, (idx, f)| match acc {
                            Some((_, wf)) if wf >= f => acc,
                            _ => Some((idx, f)),
                        });
                    if let Some((idx, _)) = worst {
                        debug!(
                            generation,
                            before = candidate_fitness,
                            after = outcome.fitness,
                            replaced = idx,
                            "annealing improved generation best"
                        );
                        next[idx] = outcome.solution;
                    }
                }
            }
        }

        Ok(next)
    }

    /// Copies of the `k` fittest individuals, best first.
    pub fn elite(&mut self, k: usize) -> Vec<Solution> {
        let fitness = self.evaluate();
        let mut order: Vec<usize> = (0..self.population.len()).collect();
        order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));
        order
            .into_iter()
            .take(k)
            .map(|i| self.population[i].clone())
            .collect()
    }

    /// Overwrites the worst individuals with `migrants`.
    ///
    /// Each migrant replaces a distinct index from a worst-first ordering
    /// computed once for the whole batch. Returns the number replaced.
    pub fn replace_worst(&mut self, migrants: Vec<Solution>) -> usize {
        let fitness = self.evaluate();
        let mut order: Vec<usize> = (0..self.population.len()).collect();
        order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

        let mut replaced = 0;
        for (idx, migrant) in order.into_iter().zip(migrants) {
            self.population[idx] = migrant;
            replaced += 1;
        }
        replaced
    }

    /// Runs the configured number of generations from a fresh population.
    pub fn run(&mut self) -> Result<EvolutionResult, ConfigError> {
        self.initialize()?;
        self.history.clear();
        for generation in 0..self.config.generations {
            self.step(generation)?;
        }
        self.evaluate();

        let (best_solution, best_fitness) = self
            .best
            .clone()
            .unwrap_or_else(|| (Solution::default(), f64::INFINITY));
        debug!(best_fitness, generations = self.config.generations, "evolution finished");

        Ok(EvolutionResult {
            best_solution,
            best_fitness,
            history: self.history.clone(),
        })
    }
}
