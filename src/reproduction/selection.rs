use std::cmp::Ordering;

use crate::error::{GeneticError, Result};
use crate::fitness::Scored;

/// Truncation selection: keeps the top `floor(population_size * selection_pressure)`
/// candidates of a ranked population as the breeding pool.
///
/// Ranking is a stable descending sort on fitness, so candidates with equal
/// scores keep their population order. Reproducible runs under a fixed seed
/// depend on that.
///
/// # Examples
///
/// ```
/// use hamlet_evolver::alphabet::Alphabet;
/// use hamlet_evolver::candidate::Candidate;
/// use hamlet_evolver::fitness::Scored;
/// use hamlet_evolver::reproduction::TruncationSelection;
///
/// let alphabet = Alphabet::new("AB").unwrap();
/// let scored = vec![
///     Scored::new(Candidate::from_text("AA", &alphabet).unwrap(), 0.5),
///     Scored::new(Candidate::from_text("AB", &alphabet).unwrap(), 1.0),
///     Scored::new(Candidate::from_text("BA", &alphabet).unwrap(), 0.0),
///     Scored::new(Candidate::from_text("BB", &alphabet).unwrap(), 0.5),
/// ];
///
/// let selection = TruncationSelection::new(0.5).unwrap();
/// let ranked = TruncationSelection::rank(scored);
/// let parents = selection.select(&ranked).unwrap();
///
/// assert_eq!(parents.len(), 2);
/// assert_eq!(parents[0].candidate.to_text(), "AB");
/// assert_eq!(parents[1].candidate.to_text(), "AA");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TruncationSelection {
    selection_pressure: f64,
}

impl TruncationSelection {
    /// Creates a new selection with the given pressure.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` unless `selection_pressure` is in `(0, 1]`.
    pub fn new(selection_pressure: f64) -> Result<Self> {
        if !(selection_pressure > 0.0 && selection_pressure <= 1.0) {
            return Err(GeneticError::Configuration(format!(
                "Selection pressure must be in (0, 1], got {}",
                selection_pressure
            )));
        }

        Ok(Self { selection_pressure })
    }

    pub fn selection_pressure(&self) -> f64 {
        self.selection_pressure
    }

    /// Size of the breeding pool for a population of `population_size`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` when the pressure is too small to
    /// keep a single parent.
    pub fn num_parents(&self, population_size: usize) -> Result<usize> {
        let num_parents = (population_size as f64 * self.selection_pressure).floor() as usize;

        if num_parents == 0 {
            return Err(GeneticError::Configuration(format!(
                "Selection pressure {} keeps no parents out of a population of {}",
                self.selection_pressure, population_size
            )));
        }

        Ok(num_parents.min(population_size))
    }

    /// Sorts a scored population best-first, preserving order among ties.
    pub fn rank(mut scored: Vec<Scored>) -> Vec<Scored> {
        // sort_by is stable
        scored.sort_by(|a, b| {
            b.fitness.partial_cmp(&a.fitness).unwrap_or_else(|| {
                if b.fitness.is_nan() {
                    Ordering::Less
                } else if a.fitness.is_nan() {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
        });
        scored
    }

    /// Returns the breeding pool: the head of an already ranked population.
    pub fn select<'a>(&self, ranked: &'a [Scored]) -> Result<&'a [Scored]> {
        if ranked.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        let num_parents = self.num_parents(ranked.len())?;
        Ok(&ranked[..num_parents])
    }
}
