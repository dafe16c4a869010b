//! # Candidate
//!
//! A `Candidate` is one fixed-length string in the search population. It is
//! immutable: crossover and mutation never edit a parent in place, they
//! build a new `Candidate`.
//!
//! ## Example
//!
//! ```rust
//! use hamlet_evolver::alphabet::Alphabet;
//! use hamlet_evolver::candidate::Candidate;
//! use hamlet_evolver::rng::RandomNumberGenerator;
//!
//! let alphabet = Alphabet::standard();
//! let mut rng = RandomNumberGenerator::from_seed(1);
//!
//! let a = Candidate::random(12, &alphabet, &mut rng);
//! let b = Candidate::random(12, &alphabet, &mut rng);
//! let child = a.crossover(&b, &mut rng).mutate(0.05, &alphabet, &mut rng);
//!
//! assert_eq!(child.len(), 12);
//! ```

use std::fmt;

use crate::{
    alphabet::Alphabet,
    error::{GeneticError, Result},
    rng::RandomNumberGenerator,
};

/// An ordered, fixed-length sequence of alphabet symbols.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    genes: Vec<u8>,
}

impl Candidate {
    /// Draws `length` independent uniform samples from `alphabet`.
    pub fn random(length: usize, alphabet: &Alphabet, rng: &mut RandomNumberGenerator) -> Self {
        let genes = (0..length).map(|_| alphabet.sample(rng)).collect();
        Self { genes }
    }

    /// Builds a candidate from text, checking every character against `alphabet`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Validation` listing the offending characters.
    pub fn from_text(text: &str, alphabet: &Alphabet) -> Result<Self> {
        alphabet
            .validate(text)
            .map_err(|invalid| GeneticError::Validation { invalid })?;

        Ok(Self {
            genes: text.as_bytes().to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.genes
    }

    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.genes).into_owned()
    }

    /// Single-point crossover at `point`: `self[..point] + other[point..]`.
    ///
    /// A point of 0 yields a copy of `other`, a point of `self.len()` yields a
    /// copy of `self`. Points past the end are clamped.
    pub fn crossover_at(&self, other: &Self, point: usize) -> Self {
        let point = point.min(self.genes.len()).min(other.genes.len());

        let mut genes = Vec::with_capacity(other.genes.len());
        genes.extend_from_slice(&self.genes[..point]);
        genes.extend_from_slice(&other.genes[point..]);

        Self { genes }
    }

    /// Single-point crossover at a uniformly drawn point in `[0, len]`.
    pub fn crossover(&self, other: &Self, rng: &mut RandomNumberGenerator) -> Self {
        let point = rng.gen_split_point(self.genes.len());
        self.crossover_at(other, point)
    }

    /// Returns a copy where every symbol is independently replaced, with
    /// probability `rate`, by a fresh uniform draw from `alphabet`.
    ///
    /// One probability draw is consumed per position regardless of `rate`.
    pub fn mutate(&self, rate: f64, alphabet: &Alphabet, rng: &mut RandomNumberGenerator) -> Self {
        let genes = self
            .genes
            .iter()
            .map(|&gene| {
                if rng.chance(rate) {
                    alphabet.sample(rng)
                } else {
                    gene
                }
            })
            .collect();

        Self { genes }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.genes))
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Candidate({:?})", String::from_utf8_lossy(&self.genes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ab() -> Alphabet {
        Alphabet::new("AB").unwrap()
    }

    #[test]
    fn test_random_candidate_length_and_symbols() {
        let alphabet = Alphabet::standard();
        let mut rng = RandomNumberGenerator::from_seed(5);
        let candidate = Candidate::random(64, &alphabet, &mut rng);

        assert_eq!(candidate.len(), 64);
        assert!(alphabet.validate(&candidate.to_text()).is_ok());
    }

    #[test]
    fn test_crossover_split_extremes() {
        let alphabet = ab();
        let p1 = Candidate::from_text("AAAA", &alphabet).unwrap();
        let p2 = Candidate::from_text("BBBB", &alphabet).unwrap();

        assert_eq!(p1.crossover_at(&p2, 0), p2);
        assert_eq!(p1.crossover_at(&p2, 4), p1);
        assert_eq!(p1.crossover_at(&p2, 1).to_text(), "ABBB");
    }

    #[test]
    fn test_crossover_leaves_parents_untouched() {
        let alphabet = ab();
        let p1 = Candidate::from_text("AAAA", &alphabet).unwrap();
        let p2 = Candidate::from_text("BBBB", &alphabet).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(9);

        let _ = p1.crossover(&p2, &mut rng);

        assert_eq!(p1.to_text(), "AAAA");
        assert_eq!(p2.to_text(), "BBBB");
    }

    #[test]
    fn test_mutate_rates() {
        let alphabet = ab();
        let parent = Candidate::from_text("AAAAAAAA", &alphabet).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(2);

        assert_eq!(parent.mutate(0.0, &alphabet, &mut rng), parent);

        let only_b = Alphabet::new("B").unwrap();
        assert_eq!(parent.mutate(1.0, &only_b, &mut rng).to_text(), "BBBBBBBB");
        assert_eq!(parent.to_text(), "AAAAAAAA");
    }

    #[test]
    fn test_from_text_rejects_foreign_symbols() {
        let result = Candidate::from_text("ABC", &ab());

        match result {
            Err(GeneticError::Validation { invalid }) => {
                assert_eq!(invalid.into_iter().collect::<Vec<_>>(), vec!['C']);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    proptest! {
        #[test]
        fn crossover_preserves_length(seed in any::<u64>(), len in 0usize..64) {
            let alphabet = Alphabet::standard();
            let mut rng = RandomNumberGenerator::from_seed(seed);
            let p1 = Candidate::random(len, &alphabet, &mut rng);
            let p2 = Candidate::random(len, &alphabet, &mut rng);

            let child = p1.crossover(&p2, &mut rng);
            prop_assert_eq!(child.len(), len);

            let mutated = child.mutate(0.5, &alphabet, &mut rng);
            prop_assert_eq!(mutated.len(), len);
        }

        #[test]
        fn crossover_takes_prefix_then_suffix(point in 0usize..=16) {
            let alphabet = ab();
            let p1 = Candidate::from_text(&"A".repeat(16), &alphabet).unwrap();
            let p2 = Candidate::from_text(&"B".repeat(16), &alphabet).unwrap();

            let child = p1.crossover_at(&p2, point);
            let expected = format!("{}{}", "A".repeat(point), "B".repeat(16 - point));
            prop_assert_eq!(child.to_text(), expected);
        }
    }
}
