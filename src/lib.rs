//! Skill-aware task scheduling with a hybrid island-model genetic algorithm.
//!
//! Assigns interdependent tasks to workers with differing skill levels,
//! choosing a worker and a start time per task. Candidate schedules are
//! scored by a weighted penalty over makespan, dependency violations, skill
//! mismatch, workload imbalance, and worker overlap, then evolved by several
//! differently-tuned populations that periodically exchange their best
//! members.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Worker`, `Problem`, `Solution`,
//!   `Schedule`
//! - **`validation`**: Input integrity checks (duplicate IDs, DAG cycles,
//!   dangling dependencies, invalid durations and skill levels)
//! - **`ga`**: Fitness, initialization, selection, crossover, mutation,
//!   local search, simulated annealing, evolution engine, island model
//! - **`scheduler`**: Schedule repair, feasibility checks, and KPIs
//! - **`error`**: Configuration errors
//!
//! # Example
//!
//! ```
//! use u_skillsched::ga::{IslandModel, IslandModelConfig};
//! use u_skillsched::models::{Problem, Task, Worker};
//!
//! let problem = Problem::new(
//!     vec![
//!         Task::new("T1", 2.0),
//!         Task::new("T2", 3.0).with_dependency("T1"),
//!         Task::new("T3", 5.0).with_requirement("rust", 2.0),
//!     ],
//!     vec![Worker::new("W1"), Worker::new("W2").with_skill("rust", 3.0)],
//! ).unwrap();
//!
//! let config = IslandModelConfig::default()
//!     .with_generations(5)
//!     .with_population_size(10)
//!     .with_seed(42);
//! let result = IslandModel::new(problem, config).unwrap().run().unwrap();
//! assert!(result.best_fitness.is_finite());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"
//! - Whitley, Rana & Heckendorn (1999), "The Island Model Genetic Algorithm"

pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::ConfigError;
