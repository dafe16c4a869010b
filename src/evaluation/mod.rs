//! # Fitness Evaluation Strategies
//!
//! A `FitnessEvaluator` scores a whole population against the target. Three
//! interchangeable implementations exist:
//!
//! - [`SequentialEvaluator`]: one candidate after another on the calling thread.
//! - [`ThreadPoolEvaluator`]: contiguous chunks, one per thread, on a rayon
//!   pool built once per run.
//! - [`ProcessPoolEvaluator`]: batches serialized to long-lived worker
//!   processes and merged back in population order.
//!
//! Every strategy returns scores in population order, and the fitness of a
//! candidate never depends on the strategy that computed it. The strategy is
//! picked once per run through [`EvaluationStrategy`].
//!
//! ## Example
//!
//! ```rust
//! use hamlet_evolver::alphabet::Alphabet;
//! use hamlet_evolver::candidate::Candidate;
//! use hamlet_evolver::evaluation::{EvaluationStrategy, ThreadPoolConfig};
//! use hamlet_evolver::fitness::Target;
//! use hamlet_evolver::rng::RandomNumberGenerator;
//!
//! let alphabet = Alphabet::standard();
//! let target = Target::new("Something is rotten", &alphabet).unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(3);
//! let population: Vec<Candidate> = (0..64)
//!     .map(|_| Candidate::random(target.len(), &alphabet, &mut rng))
//!     .collect();
//!
//! let mut sequential = EvaluationStrategy::Sequential.build().unwrap();
//! let mut threaded = EvaluationStrategy::ThreadPool(ThreadPoolConfig::with_threads(4))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     sequential.evaluate(&population, &target).unwrap(),
//!     threaded.evaluate(&population, &target).unwrap()
//! );
//! ```

pub mod process_pool;
pub mod sequential;
pub mod thread_pool;
pub mod worker;

use std::fmt;

use crate::{
    candidate::Candidate,
    error::Result,
    fitness::{Scored, Target},
};

pub use process_pool::{ProcessPoolConfig, ProcessPoolEvaluator};
pub use sequential::SequentialEvaluator;
pub use thread_pool::{ThreadPoolConfig, ThreadPoolEvaluator};

/// Computes `(candidate, fitness)` pairs for an entire population.
///
/// Implementations own whatever workers they need and release them on drop.
/// An evaluation is all-or-nothing: either every candidate is scored, in
/// population order, or an error is returned.
pub trait FitnessEvaluator: Send {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Scores every candidate of `population` against `target`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::WorkerPool` if a worker fails to deliver its
    /// share of the scores.
    fn evaluate(&mut self, population: &[Candidate], target: &Target) -> Result<Vec<Scored>>;
}

/// The evaluation strategy of a run, selected once and never re-selected
/// between generations.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EvaluationStrategy {
    #[default]
    Sequential,
    ThreadPool(ThreadPoolConfig),
    ProcessPool(ProcessPoolConfig),
}

impl EvaluationStrategy {
    /// A thread pool sized to the available processing units.
    pub fn thread_pool() -> Self {
        EvaluationStrategy::ThreadPool(ThreadPoolConfig::default())
    }

    /// A process pool with the default worker count and batch size.
    pub fn process_pool() -> Self {
        EvaluationStrategy::ProcessPool(ProcessPoolConfig::default())
    }

    /// Creates the evaluator, starting any worker threads or processes.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::WorkerPool` if the pool cannot be started, or
    /// `GeneticError::Configuration` if the process worker cannot be found.
    pub fn build(&self) -> Result<Box<dyn FitnessEvaluator>> {
        match self {
            EvaluationStrategy::Sequential => Ok(Box::new(SequentialEvaluator::new())),
            EvaluationStrategy::ThreadPool(config) => {
                Ok(Box::new(ThreadPoolEvaluator::new(config)?))
            }
            EvaluationStrategy::ProcessPool(config) => {
                Ok(Box::new(ProcessPoolEvaluator::new(config)?))
            }
        }
    }
}

impl fmt::Display for EvaluationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationStrategy::Sequential => write!(f, "sequential"),
            EvaluationStrategy::ThreadPool(_) => write!(f, "thread-pool"),
            EvaluationStrategy::ProcessPool(_) => write!(f, "process-pool"),
        }
    }
}

/// Number of processing units, falling back to one.
pub(crate) fn available_units() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
