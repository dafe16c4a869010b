//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds every parameter of a run: population
//! size, the reproduction rates, the stopping rules, the evaluation strategy
//! and the random seed.
//!
//! ## Example
//!
//! ```rust
//! use hamlet_evolver::evaluation::EvaluationStrategy;
//! use hamlet_evolver::evolution::options::EvolutionOptions;
//!
//! // Tuned defaults: 900 candidates, mutation 0.06, pressure 0.15, crossover 0.75
//! let default_options = EvolutionOptions::default();
//! assert_eq!(default_options.get_population_size(), 900);
//!
//! let options = EvolutionOptions::builder()
//!     .population_size(200)
//!     .max_generations(500)
//!     .strategy(EvaluationStrategy::thread_pool())
//!     .seed(42)
//!     .build();
//!
//! assert!(options.validate().is_ok());
//! ```
//!
//! ## Defaults
//!
//! | option | default |
//! |---|---|
//! | `population_size` | 900 |
//! | `mutation_rate` | 0.06 |
//! | `selection_pressure` | 0.15 |
//! | `crossover_rate` | 0.75 |
//! | `max_generations` | unbounded |
//! | `fitness_threshold` | 0.95 |
//! | `strategy` | sequential |
//! | `mutation_mode` | static |
//! | `alphabet` | standard ASCII alphabet |
//! | `seed` | from entropy |

use crate::{
    alphabet::Alphabet,
    error::{GeneticError, Result},
    evaluation::EvaluationStrategy,
    mutation_rate::MutationMode,
    reproduction::TruncationSelection,
};

pub const DEFAULT_POPULATION_SIZE: usize = 900;
pub const DEFAULT_MUTATION_RATE: f64 = 0.06;
pub const DEFAULT_SELECTION_PRESSURE: f64 = 0.15;
pub const DEFAULT_CROSSOVER_RATE: f64 = 0.75;
pub const DEFAULT_FITNESS_THRESHOLD: f64 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOptions {
    population_size: usize,
    mutation_rate: f64,
    selection_pressure: f64,
    crossover_rate: f64,
    /// `None` runs until the fitness threshold is reached or the run is stopped.
    max_generations: Option<usize>,
    fitness_threshold: f64,
    strategy: EvaluationStrategy,
    mutation_mode: MutationMode,
    alphabet: Alphabet,
    /// `None` seeds from system entropy.
    seed: Option<u64>,
}

impl EvolutionOptions {
    /// Creates options with the given reproduction parameters and defaults for
    /// everything else.
    pub fn new(
        population_size: usize,
        mutation_rate: f64,
        selection_pressure: f64,
        crossover_rate: f64,
    ) -> Self {
        Self {
            population_size,
            mutation_rate,
            selection_pressure,
            crossover_rate,
            ..Self::default()
        }
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn get_selection_pressure(&self) -> f64 {
        self.selection_pressure
    }

    pub fn get_crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    pub fn get_max_generations(&self) -> Option<usize> {
        self.max_generations
    }

    pub fn get_fitness_threshold(&self) -> f64 {
        self.fitness_threshold
    }

    pub fn get_strategy(&self) -> &EvaluationStrategy {
        &self.strategy
    }

    pub fn get_mutation_mode(&self) -> MutationMode {
        self.mutation_mode
    }

    pub fn get_alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Sets the population size.
    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    /// Sets the per-symbol mutation probability.
    pub fn set_mutation_rate(&mut self, mutation_rate: f64) {
        self.mutation_rate = mutation_rate;
    }

    /// Sets the fraction of the population kept as parents.
    pub fn set_selection_pressure(&mut self, selection_pressure: f64) {
        self.selection_pressure = selection_pressure;
    }

    /// Sets the crossover probability.
    pub fn set_crossover_rate(&mut self, crossover_rate: f64) {
        self.crossover_rate = crossover_rate;
    }

    /// Sets the generation limit. `None` means unbounded.
    pub fn set_max_generations(&mut self, max_generations: Option<usize>) {
        self.max_generations = max_generations;
    }

    /// Sets the best fitness at which the run stops.
    pub fn set_fitness_threshold(&mut self, fitness_threshold: f64) {
        self.fitness_threshold = fitness_threshold;
    }

    /// Sets the fitness evaluation strategy.
    pub fn set_strategy(&mut self, strategy: EvaluationStrategy) {
        self.strategy = strategy;
    }

    /// Sets the mutation mode.
    pub fn set_mutation_mode(&mut self, mutation_mode: MutationMode) {
        self.mutation_mode = mutation_mode;
    }

    /// Sets the symbol set of target and candidates.
    pub fn set_alphabet(&mut self, alphabet: Alphabet) {
        self.alphabet = alphabet;
    }

    /// Sets the random seed. `None` seeds from system entropy.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Checks every parameter before a run starts.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` if:
    /// - The population size is zero
    /// - A rate lies outside `[0, 1]` or the fitness threshold outside `(0, 1]`
    /// - The selection pressure leaves no parents for this population size
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(GeneticError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(GeneticError::Configuration(format!(
                "Mutation rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }

        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(GeneticError::Configuration(format!(
                "Crossover rate must be in [0, 1], got {}",
                self.crossover_rate
            )));
        }

        if !(self.fitness_threshold > 0.0 && self.fitness_threshold <= 1.0) {
            return Err(GeneticError::Configuration(format!(
                "Fitness threshold must be in (0, 1], got {}",
                self.fitness_threshold
            )));
        }

        TruncationSelection::new(self.selection_pressure)?.num_parents(self.population_size)?;

        Ok(())
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hamlet_evolver::alphabet::Alphabet;
    /// use hamlet_evolver::evolution::options::EvolutionOptions;
    /// use hamlet_evolver::mutation_rate::MutationMode;
    ///
    /// let options = EvolutionOptions::builder()
    ///     .population_size(10)
    ///     .mutation_rate(0.5)
    ///     .selection_pressure(0.5)
    ///     .crossover_rate(0.5)
    ///     .fitness_threshold(1.0)
    ///     .mutation_mode(MutationMode::Adaptive)
    ///     .alphabet(Alphabet::new("AB").unwrap())
    ///     .build();
    ///
    /// assert_eq!(options.get_max_generations(), None);
    /// ```
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            mutation_rate: DEFAULT_MUTATION_RATE,
            selection_pressure: DEFAULT_SELECTION_PRESSURE,
            crossover_rate: DEFAULT_CROSSOVER_RATE,
            max_generations: None,
            fitness_threshold: DEFAULT_FITNESS_THRESHOLD,
            strategy: EvaluationStrategy::Sequential,
            mutation_mode: MutationMode::Static,
            alphabet: Alphabet::standard(),
            seed: None,
        }
    }
}

/// Builder for `EvolutionOptions`.
///
/// Provides a fluent interface for constructing `EvolutionOptions` instances.
/// Unset fields take their defaults.
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    population_size: Option<usize>,
    mutation_rate: Option<f64>,
    selection_pressure: Option<f64>,
    crossover_rate: Option<f64>,
    max_generations: Option<usize>,
    fitness_threshold: Option<f64>,
    strategy: Option<EvaluationStrategy>,
    mutation_mode: Option<MutationMode>,
    alphabet: Option<Alphabet>,
    seed: Option<u64>,
}

impl EvolutionOptionsBuilder {
    /// Sets the population size.
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    /// Sets the mutation rate.
    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    /// Sets the selection pressure.
    pub fn selection_pressure(mut self, value: f64) -> Self {
        self.selection_pressure = Some(value);
        self
    }

    /// Sets the crossover rate.
    pub fn crossover_rate(mut self, value: f64) -> Self {
        self.crossover_rate = Some(value);
        self
    }

    /// Caps the run at `value` generations.
    pub fn max_generations(mut self, value: usize) -> Self {
        self.max_generations = Some(value);
        self
    }

    /// Sets the fitness threshold.
    pub fn fitness_threshold(mut self, value: f64) -> Self {
        self.fitness_threshold = Some(value);
        self
    }

    /// Sets the evaluation strategy.
    pub fn strategy(mut self, value: EvaluationStrategy) -> Self {
        self.strategy = Some(value);
        self
    }

    /// Sets the mutation mode.
    pub fn mutation_mode(mut self, value: MutationMode) -> Self {
        self.mutation_mode = Some(value);
        self
    }

    /// Sets the alphabet.
    pub fn alphabet(mut self, value: Alphabet) -> Self {
        self.alphabet = Some(value);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    pub fn build(self) -> EvolutionOptions {
        EvolutionOptions {
            population_size: self.population_size.unwrap_or(DEFAULT_POPULATION_SIZE),
            mutation_rate: self.mutation_rate.unwrap_or(DEFAULT_MUTATION_RATE),
            selection_pressure: self.selection_pressure.unwrap_or(DEFAULT_SELECTION_PRESSURE),
            crossover_rate: self.crossover_rate.unwrap_or(DEFAULT_CROSSOVER_RATE),
            max_generations: self.max_generations,
            fitness_threshold: self.fitness_threshold.unwrap_or(DEFAULT_FITNESS_THRESHOLD),
            strategy: self.strategy.unwrap_or_default(),
            mutation_mode: self.mutation_mode.unwrap_or_default(),
            alphabet: self.alphabet.unwrap_or_default(),
            seed: self.seed,
        }
    }
}
