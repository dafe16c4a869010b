//! # Error Types
//!
//! This module defines the error type shared by every part of the evolver.
//! Configuration problems are reported eagerly, before the generation loop
//! starts; worker failures abort the run because a missing score would corrupt
//! the ranking.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use hamlet_evolver::error::{GeneticError, Result};
//!
//! fn check_population(size: usize) -> Result<()> {
//!     if size == 0 {
//!         return Err(GeneticError::Configuration(
//!             "Population size cannot be zero".to_string(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_population(0).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use hamlet_evolver::error::{GeneticError, OptionExt};
//!
//! fn best_score(scores: &[u32]) -> hamlet_evolver::error::Result<u32> {
//!     scores.iter().max().cloned().ok_or_else_genetic(||
//!         GeneticError::EmptyPopulation
//!     )
//! }
//!
//! assert_eq!(best_score(&[3, 9, 4]).unwrap(), 9);
//! ```

use std::collections::BTreeSet;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while evolving a candidate string.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// The target text contains symbols outside the configured alphabet.
    #[error("Validation error: target contains characters outside the alphabet: {}", format_symbols(.invalid))]
    Validation { invalid: BTreeSet<char> },

    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A candidate and the target disagree on length.
    #[error("Length mismatch: expected {expected} symbols, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when a fitness calculation fails.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// A worker (thread or process) failed to deliver a batch of scores.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A work item or result could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

fn format_symbols(symbols: &BTreeSet<char>) -> String {
    symbols
        .iter()
        .map(|c| format!("{:?}", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A specialized Result type for evolver operations.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use hamlet_evolver::error::ResultExt;
/// use std::fs::File;
///
/// fn open_target(path: &str) -> hamlet_evolver::error::Result<()> {
///     File::open(path).context("Failed to open target file")?;
///     Ok(())
/// }
///
/// assert!(open_target("/definitely/not/here.txt").is_err());
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error into a `GeneticError::Other` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GeneticError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GeneticError>` using
    /// a closure to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_symbols() {
        let invalid: BTreeSet<char> = ['é', '\u{7f}'].into_iter().collect();
        let message = GeneticError::Validation { invalid }.to_string();

        assert!(message.contains("'é'"));
        assert!(message.contains("'\\u{7f}'"));
    }

    #[test]
    fn test_context_wraps_io_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ));

        match result.context("Failed to write batch") {
            Err(GeneticError::Other(msg)) => {
                assert_eq!(msg, "Failed to write batch: pipe closed");
            }
            _ => panic!("Expected Other error"),
        }
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))?;
            Ok(())
        }

        assert!(matches!(fails(), Err(GeneticError::Io(_))));
    }
}
