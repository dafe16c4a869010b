use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::options::EvolutionOptions;
use crate::{
    candidate::Candidate,
    error::{GeneticError, OptionExt, Result},
    evaluation::FitnessEvaluator,
    fitness::{Scored, Target},
    mutation_rate::MutationSchedule,
    reproduction::{Breeder, TruncationSelection},
    rng::RandomNumberGenerator,
};

/// Where the controller is in its generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initialized,
    Evaluating,
    Reproducing,
    Terminated,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Best fitness reached the configured threshold.
    ThresholdReached,
    /// The configured generation limit was reached.
    GenerationLimit,
    /// A [`StopHandle`] was raised.
    Interrupted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::ThresholdReached => write!(f, "fitness threshold reached"),
            TerminationReason::GenerationLimit => write!(f, "generation limit reached"),
            TerminationReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// The outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestResult {
    /// The best candidate observed during the run.
    pub best_candidate: String,
    /// The fitness of `best_candidate`.
    pub best_fitness: f64,
    /// The generation at which the run terminated.
    pub generations_run: usize,
    pub termination: TerminationReason,
}

/// Receives `(generation, best_fitness)` after every evaluation.
pub trait ProgressObserver {
    fn observe(&mut self, generation: usize, best_fitness: f64);
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, f64),
{
    fn observe(&mut self, generation: usize, best_fitness: f64) {
        self(generation, best_fitness)
    }
}

/// Requests that a run stop at the next check between generations.
///
/// A generation that is already being evaluated always finishes first.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Drives one run through `Initialized -> Evaluating -> (Terminated | Reproducing -> Evaluating)`.
///
/// The controller owns the target, the population, the run's random source
/// and the fitness evaluator. Worker threads or processes held by the
/// evaluator are released when the controller is dropped, however the run ends.
pub struct EvolutionController {
    target: Target,
    population_size: usize,
    max_generations: Option<usize>,
    fitness_threshold: f64,
    selection: TruncationSelection,
    breeder: Breeder,
    schedule: MutationSchedule,
    evaluator: Box<dyn FitnessEvaluator>,
    rng: RandomNumberGenerator,
    population: Vec<Candidate>,
    ranked: Vec<Scored>,
    generation: usize,
    best: Option<Scored>,
    phase: Phase,
    termination: Option<TerminationReason>,
    stop: StopHandle,
}

impl EvolutionController {
    /// Validates the configuration, starts the evaluator and draws the
    /// founding population.
    ///
    /// # Errors
    ///
    /// - `GeneticError::Validation` if `target` has symbols outside the alphabet
    /// - `GeneticError::Configuration` for an empty target or invalid options
    /// - `GeneticError::WorkerPool` if the evaluation workers cannot be started
    pub fn new(target: &str, options: &EvolutionOptions) -> Result<Self> {
        options.validate()?;

        let alphabet = options.get_alphabet();
        let target = Target::new(target, alphabet)?;
        let selection = TruncationSelection::new(options.get_selection_pressure())?;
        let breeder = Breeder::new(options.get_crossover_rate(), alphabet.clone())?;
        let schedule = MutationSchedule::new(options.get_mutation_mode(), options.get_mutation_rate());

        let mut rng = match options.get_seed() {
            Some(seed) => RandomNumberGenerator::from_seed(seed),
            None => RandomNumberGenerator::new(),
        };

        let evaluator = options.get_strategy().build()?;

        let population = (0..options.get_population_size())
            .map(|_| Candidate::random(target.len(), alphabet, &mut rng))
            .collect();

        info!(
            target_len = target.len(),
            population_size = options.get_population_size(),
            strategy = evaluator.name(),
            mutation_mode = ?options.get_mutation_mode(),
            "starting evolution"
        );

        Ok(Self {
            target,
            population_size: options.get_population_size(),
            max_generations: options.get_max_generations(),
            fitness_threshold: options.get_fitness_threshold(),
            selection,
            breeder,
            schedule,
            evaluator,
            rng,
            population,
            ranked: Vec::new(),
            generation: 0,
            best: None,
            phase: Phase::Initialized,
            termination: None,
            stop: StopHandle::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The population that will be, or was last, evaluated.
    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    /// The best candidate observed so far, if any generation has been evaluated.
    pub fn best(&self) -> Option<&Scored> {
        self.best.as_ref()
    }

    pub fn best_fitness(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |b| b.fitness)
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// A handle that stops this run between generations. It may be moved to
    /// another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs generations until a termination condition holds.
    ///
    /// Calling `run` again after termination returns the same result.
    ///
    /// # Errors
    ///
    /// Propagates evaluator failures. The run is aborted; no partial
    /// generation is kept.
    pub fn run(&mut self, mut observer: Option<&mut dyn ProgressObserver>) -> Result<BestResult> {
        while self.phase != Phase::Terminated {
            self.evaluate()?;

            if let Some(observer) = observer.as_deref_mut() {
                observer.observe(self.generation, self.best_fitness());
            }

            match self.termination_check() {
                Some(reason) => self.terminate(reason),
                None => self.reproduce()?,
            }
        }

        self.result()
    }

    fn evaluate(&mut self) -> Result<()> {
        self.phase = Phase::Evaluating;

        let scored = self.evaluator.evaluate(&self.population, &self.target)?;
        if scored.len() != self.population.len() {
            return Err(GeneticError::FitnessCalculation(format!(
                "Evaluator {} returned {} scores for {} candidates",
                self.evaluator.name(),
                scored.len(),
                self.population.len()
            )));
        }
        self.ranked = TruncationSelection::rank(scored);

        let top = self
            .ranked
            .first()
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;
        let current_fitness = top.fitness;

        if self.best.as_ref().map_or(true, |best| current_fitness > best.fitness) {
            self.best = Some(top.clone());
        }

        debug!(
            generation = self.generation,
            current_fitness,
            best_fitness = self.best_fitness(),
            adaptive_rate = self.schedule.adaptive_rate(self.best_fitness()),
            "evaluated generation"
        );

        Ok(())
    }

    fn termination_check(&self) -> Option<TerminationReason> {
        if self.best_fitness() >= self.fitness_threshold {
            Some(TerminationReason::ThresholdReached)
        } else if self.max_generations.is_some_and(|max| self.generation >= max) {
            Some(TerminationReason::GenerationLimit)
        } else if self.stop.is_stopped() {
            Some(TerminationReason::Interrupted)
        } else {
            None
        }
    }

    fn terminate(&mut self, reason: TerminationReason) {
        self.phase = Phase::Terminated;
        self.termination = Some(reason);

        info!(
            reason = %reason,
            generations = self.generation,
            best_fitness = self.best_fitness(),
            "evolution finished"
        );
    }

    fn reproduce(&mut self) -> Result<()> {
        self.phase = Phase::Reproducing;

        let parents = self.selection.select(&self.ranked)?;
        let mutation_rate = self.schedule.rate_for(self.best_fitness());

        self.population =
            self.breeder
                .breed(parents, self.population_size, mutation_rate, &mut self.rng)?;
        self.generation += 1;

        Ok(())
    }

    fn result(&self) -> Result<BestResult> {
        let best = self
            .best
            .as_ref()
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;
        let termination = self.termination.ok_or_else_genetic(|| {
            GeneticError::Other("Evolution has not terminated".to_string())
        })?;

        Ok(BestResult {
            best_candidate: best.candidate.to_text(),
            best_fitness: best.fitness,
            generations_run: self.generation,
            termination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    fn ab_options() -> EvolutionOptions {
        EvolutionOptions::builder()
            .population_size(10)
            .mutation_rate(0.5)
            .selection_pressure(0.5)
            .crossover_rate(0.5)
            .fitness_threshold(1.0)
            .alphabet(Alphabet::new("AB").unwrap())
            .seed(11)
            .build()
    }

    #[test]
    fn test_initial_state() {
        let controller = EvolutionController::new("AB", &ab_options()).unwrap();

        assert_eq!(controller.phase(), Phase::Initialized);
        assert_eq!(controller.generation(), 0);
        assert_eq!(controller.population().len(), 10);
        assert!(controller.best().is_none());
        assert_eq!(controller.best_fitness(), 0.0);
        assert!(controller.population().iter().all(|c| c.len() == 2));
    }

    #[test]
    fn test_run_terminates_and_repeats_result() {
        let mut options = ab_options();
        options.set_max_generations(Some(50));
        let mut controller = EvolutionController::new("AB", &options).unwrap();

        let first = controller.run(None).unwrap();
        assert_eq!(controller.phase(), Phase::Terminated);
        assert_eq!(controller.termination(), Some(first.termination));

        let second = controller.run(None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generation_limit_zero_skips_reproduction() {
        let mut options = ab_options();
        options.set_max_generations(Some(0));
        options.set_fitness_threshold(1.0);
        let mut controller = EvolutionController::new("ABABABABABAB", &options).unwrap();
        let founders = controller.population().to_vec();

        let result = controller.run(None).unwrap();

        assert_eq!(result.generations_run, 0);
        assert_eq!(controller.population(), founders.as_slice());
        if result.best_fitness < 1.0 {
            assert_eq!(result.termination, TerminationReason::GenerationLimit);
        }
    }

    #[test]
    fn test_stop_before_run() {
        let options = EvolutionOptions::builder()
            .population_size(20)
            .selection_pressure(0.5)
            .fitness_threshold(1.0)
            .seed(5)
            .build();
        let mut controller =
            EvolutionController::new("To be, or not to be, that is the question", &options)
                .unwrap();

        controller.stop_handle().stop();
        let result = controller.run(None).unwrap();

        assert_eq!(result.termination, TerminationReason::Interrupted);
        assert_eq!(result.generations_run, 0);
    }

    #[test]
    fn test_best_only_improves() {
        let options = EvolutionOptions::builder()
            .population_size(30)
            .selection_pressure(0.2)
            .max_generations(25)
            .seed(3)
            .build();
        let mut controller = EvolutionController::new("Frailty, thy name is woman", &options)
            .unwrap();

        let mut last = 0.0;
        let mut observer = |_generation: usize, best: f64| {
            assert!(best >= last);
            last = best;
        };
        let result = controller.run(Some(&mut observer)).unwrap();

        let best = controller.best().unwrap();
        assert_eq!(best.fitness, result.best_fitness);
        assert_eq!(controller.target().score(&best.candidate), best.fitness);
    }

    #[test]
    fn test_rejects_foreign_target() {
        match EvolutionController::new("ABC", &ab_options()) {
            Err(GeneticError::Validation { invalid }) => {
                assert_eq!(invalid.into_iter().collect::<Vec<_>>(), vec!['C']);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_rejects_empty_target() {
        assert!(matches!(
            EvolutionController::new("", &ab_options()),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_termination_reason_serializes() {
        let json = serde_json::to_string(&TerminationReason::ThresholdReached).unwrap();
        assert_eq!(json, "\"ThresholdReached\"");
    }
}
