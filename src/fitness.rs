//! # Fitness
//!
//! Fitness is the fraction of positions where a candidate matches the target,
//! a value in `[0.0, 1.0]`. It is pure and deterministic, so every evaluation
//! strategy produces bit-identical scores for the same candidate.
//!
//! ```rust
//! use hamlet_evolver::fitness::fitness;
//!
//! assert_eq!(fitness(b"to be", b"to be"), 1.0);
//! assert_eq!(fitness(b"tx bx", b"to be"), 0.6);
//! // Mismatched lengths score zero instead of failing.
//! assert_eq!(fitness(b"to", b"to be"), 0.0);
//! ```

use std::sync::Arc;

use crate::{
    alphabet::Alphabet,
    candidate::Candidate,
    error::{GeneticError, Result},
};

/// Number of positions where `candidate` and `target` hold the same symbol.
pub fn matches(candidate: &[u8], target: &[u8]) -> usize {
    candidate
        .iter()
        .zip(target)
        .filter(|&(a, b)| a == b)
        .count()
}

/// Converts a match count into a fitness score.
///
/// Every strategy funnels through this function, including the process pool
/// which ships integer match counts across the process boundary.
pub fn fitness_from_matches(matches: usize, target_len: usize) -> f64 {
    if target_len == 0 {
        return if matches == 0 { 1.0 } else { 0.0 };
    }
    matches as f64 / target_len as f64
}

/// Scores `candidate` against `target`, returning 0.0 when the lengths differ.
///
/// Candidates are equal-length by construction, so the zero score is a
/// fallback rather than an expected outcome.
pub fn fitness(candidate: &[u8], target: &[u8]) -> f64 {
    if candidate.len() != target.len() {
        return 0.0;
    }
    fitness_from_matches(matches(candidate, target), target.len())
}

/// Strict match count.
///
/// # Errors
///
/// Returns `GeneticError::LengthMismatch` when the lengths differ.
pub fn try_matches(candidate: &[u8], target: &[u8]) -> Result<usize> {
    if candidate.len() != target.len() {
        return Err(GeneticError::LengthMismatch {
            expected: target.len(),
            actual: candidate.len(),
        });
    }
    Ok(matches(candidate, target))
}

/// Strict variant of [`fitness`].
///
/// # Errors
///
/// Returns `GeneticError::LengthMismatch` when the lengths differ.
pub fn try_fitness(candidate: &[u8], target: &[u8]) -> Result<f64> {
    let matches = try_matches(candidate, target)?;
    Ok(fitness_from_matches(matches, target.len()))
}

/// A candidate paired with its fitness for the current generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub candidate: Candidate,
    pub fitness: f64,
}

impl Scored {
    pub fn new(candidate: Candidate, fitness: f64) -> Self {
        Self { candidate, fitness }
    }
}

/// The immutable string a run converges toward.
///
/// Cloning is cheap; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    text: Arc<[u8]>,
}

impl Target {
    /// Validates `text` against `alphabet` and wraps it.
    ///
    /// # Errors
    ///
    /// - `GeneticError::Configuration` if `text` is empty.
    /// - `GeneticError::Validation` if `text` contains symbols outside `alphabet`.
    pub fn new(text: &str, alphabet: &Alphabet) -> Result<Self> {
        if text.is_empty() {
            return Err(GeneticError::Configuration(
                "Target text cannot be empty".to_string(),
            ));
        }

        alphabet
            .validate(text)
            .map_err(|invalid| GeneticError::Validation { invalid })?;

        Ok(Self {
            text: Arc::from(text.as_bytes()),
        })
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.text).into_owned()
    }

    pub fn score(&self, candidate: &Candidate) -> f64 {
        fitness(candidate.as_bytes(), &self.text)
    }

    /// Scores `candidate` and pairs it with the result.
    pub fn evaluate(&self, candidate: &Candidate) -> Scored {
        Scored::new(candidate.clone(), self.score(candidate))
    }
}
