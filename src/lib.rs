pub mod alphabet;
pub mod candidate;
pub mod error;
pub mod evaluation;
pub mod evolution;
pub mod fitness;
pub mod mutation_rate;
pub mod reproduction;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result, ResultExt};
pub use evaluation::EvaluationStrategy;
pub use evolution::{evolve, BestResult, EvolutionOptions, TerminationReason};
