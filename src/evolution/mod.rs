//! # Evolution
//!
//! [`evolve`] is the entry point: it validates the configuration, runs the
//! generation loop on the configured evaluation strategy and returns the best
//! candidate it found. [`EvolutionController`] exposes the same loop for
//! callers that want to inspect the run or stop it from another thread.
//!
//! ```rust
//! use hamlet_evolver::alphabet::Alphabet;
//! use hamlet_evolver::evolution::{evolve, EvolutionOptions, TerminationReason};
//!
//! let options = EvolutionOptions::builder()
//!     .population_size(10)
//!     .mutation_rate(0.5)
//!     .selection_pressure(0.5)
//!     .crossover_rate(0.5)
//!     .fitness_threshold(1.0)
//!     .max_generations(200)
//!     .alphabet(Alphabet::new("AB").unwrap())
//!     .seed(1)
//!     .build();
//!
//! let mut progress = Vec::new();
//! let mut record = |generation: usize, best: f64| progress.push((generation, best));
//! let result = evolve("AB", &options, Some(&mut record)).unwrap();
//!
//! assert_eq!(result.termination, TerminationReason::ThresholdReached);
//! assert_eq!(result.best_candidate, "AB");
//! assert_eq!(progress.len(), result.generations_run + 1);
//! ```

pub mod controller;
pub mod options;

pub use controller::{
    BestResult, EvolutionController, Phase, ProgressObserver, StopHandle, TerminationReason,
};
pub use options::{EvolutionOptions, EvolutionOptionsBuilder};

use crate::error::Result;

/// Evolves a random population toward `target`.
///
/// `observer`, if given, receives `(generation, best_fitness)` after every
/// generation is evaluated, including generation 0.
///
/// # Errors
///
/// - `GeneticError::Validation` if `target` contains symbols outside the alphabet
/// - `GeneticError::Configuration` if the options are invalid, including a
///   selection pressure that leaves no parents
/// - `GeneticError::WorkerPool` if a fitness worker fails during the run
pub fn evolve(
    target: &str,
    options: &EvolutionOptions,
    observer: Option<&mut dyn ProgressObserver>,
) -> Result<BestResult> {
    let mut controller = EvolutionController::new(target, options)?;
    controller.run(observer)
}
