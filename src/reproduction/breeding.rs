//! # Breeder
//!
//! Builds the next generation from a breeding pool. Each child starts from a
//! uniformly chosen parent; with probability `crossover_rate` a second parent
//! is drawn and the two are joined at a random split point. The child is then
//! mutated symbol by symbol at the generation's mutation rate. The new
//! population replaces the old one entirely.

use crate::{
    alphabet::Alphabet,
    candidate::Candidate,
    error::{GeneticError, Result},
    fitness::Scored,
    rng::RandomNumberGenerator,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Breeder {
    crossover_rate: f64,
    alphabet: Alphabet,
}

impl Breeder {
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` unless `crossover_rate` is in `[0, 1]`.
    pub fn new(crossover_rate: f64, alphabet: Alphabet) -> Result<Self> {
        if !(0.0..=1.0).contains(&crossover_rate) {
            return Err(GeneticError::Configuration(format!(
                "Crossover rate must be in [0, 1], got {}",
                crossover_rate
            )));
        }

        Ok(Self {
            crossover_rate,
            alphabet,
        })
    }

    pub fn crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Produces one child from the breeding pool.
    pub fn breed_child(
        &self,
        parents: &[Scored],
        mutation_rate: f64,
        rng: &mut RandomNumberGenerator,
    ) -> Candidate {
        let first = &parents[rng.gen_index(parents.len())].candidate;

        let child = if rng.chance(self.crossover_rate) {
            let second = &parents[rng.gen_index(parents.len())].candidate;
            first.crossover(second, rng)
        } else {
            first.clone()
        };

        child.mutate(mutation_rate, &self.alphabet, rng)
    }

    /// Breeds exactly `population_size` children.
    ///
    /// ## Errors
    ///
    /// Returns `GeneticError::EmptyPopulation` if `parents` is empty.
    pub fn breed(
        &self,
        parents: &[Scored],
        population_size: usize,
        mutation_rate: f64,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Candidate>> {
        if parents.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        let mut children = Vec::with_capacity(population_size);
        while children.len() < population_size {
            children.push(self.breed_child(parents, mutation_rate, rng));
        }

        Ok(children)
    }
}
