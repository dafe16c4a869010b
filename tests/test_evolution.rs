use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use hamlet_evolver::{
    alphabet::Alphabet,
    error::GeneticError,
    evolution::{evolve, EvolutionController, EvolutionOptions, Phase, TerminationReason},
    mutation_rate::MutationMode,
};
use tracing::Level;

/// Collects formatted log output so tests can inspect it.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn ab_options(seed: u64) -> EvolutionOptions {
    EvolutionOptions::builder()
        .population_size(10)
        .mutation_rate(0.5)
        .selection_pressure(0.5)
        .crossover_rate(0.5)
        .fitness_threshold(1.0)
        .alphabet(Alphabet::new("AB").unwrap())
        .seed(seed)
        .build()
}

#[test]
fn test_converges_on_two_symbol_target() {
    for seed in 0..10 {
        let mut options = ab_options(seed);
        options.set_max_generations(Some(50));

        let result = evolve("AB", &options, None).unwrap();

        assert_eq!(result.best_candidate, "AB", "seed {}", seed);
        assert_eq!(result.best_fitness, 1.0);
        assert_eq!(result.termination, TerminationReason::ThresholdReached);
        assert!(result.generations_run <= 50);
    }
}

#[test]
fn test_zero_generations_evaluates_founders_only() {
    let options = EvolutionOptions::builder()
        .population_size(40)
        .selection_pressure(0.25)
        .max_generations(0)
        .seed(17)
        .build();

    let mut generations = Vec::new();
    let mut record = |generation: usize, best: f64| generations.push((generation, best));
    let result = evolve("Though this be madness, yet there is method in't.", &options, Some(&mut record))
        .unwrap();

    assert_eq!(result.generations_run, 0);
    assert_eq!(result.termination, TerminationReason::GenerationLimit);
    assert_eq!(generations, vec![(0, result.best_fitness)]);
    assert!((0.0..=1.0).contains(&result.best_fitness));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let options = EvolutionOptions::builder()
        .population_size(60)
        .selection_pressure(0.2)
        .max_generations(40)
        .seed(2024)
        .build();
    let target = "The rest is silence.";

    let first = evolve(target, &options, None).unwrap();
    let second = evolve(target, &options, None).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_best_fitness_never_decreases() {
    let options = EvolutionOptions::builder()
        .population_size(80)
        .mutation_rate(0.1)
        .selection_pressure(0.15)
        .max_generations(60)
        .seed(99)
        .build();

    let mut history = Vec::new();
    let mut record = |generation: usize, best: f64| history.push((generation, best));
    let result = evolve("Get thee to a nunnery", &options, Some(&mut record)).unwrap();

    assert_eq!(history.len(), result.generations_run + 1);
    for (i, window) in history.windows(2).enumerate() {
        assert_eq!(window[0].0, i);
        assert!(window[1].1 >= window[0].1, "best fitness dropped at {}", i + 1);
    }
    assert_eq!(history.last().map(|h| h.1), Some(result.best_fitness));
}

#[test]
fn test_population_keeps_size_and_length() {
    let options = EvolutionOptions::builder()
        .population_size(33)
        .selection_pressure(0.3)
        .fitness_threshold(1.0)
        .seed(4)
        .build();
    let target = "O, what a noble mind is here o'erthrown!";
    let mut controller = EvolutionController::new(target, &options).unwrap();
    let stop = controller.stop_handle();

    let mut observed = 0;
    let mut check = |_generation: usize, _best: f64| {
        observed += 1;
        if observed == 20 {
            stop.stop();
        }
    };
    let result = controller.run(Some(&mut check)).unwrap();

    assert_eq!(result.termination, TerminationReason::Interrupted);
    assert_eq!(result.generations_run, 19);
    assert_eq!(controller.phase(), Phase::Terminated);
    assert_eq!(controller.population().len(), 33);
    assert!(controller.population().iter().all(|c| c.len() == target.len()));
}

#[test]
fn test_adaptive_mode_runs() {
    let options = EvolutionOptions::builder()
        .population_size(100)
        .selection_pressure(0.1)
        .mutation_mode(MutationMode::Adaptive)
        .max_generations(300)
        .seed(8)
        .build();

    let result = evolve("Alas, poor Yorick", &options, None).unwrap();

    assert_eq!(result.best_candidate.len(), "Alas, poor Yorick".len());
    assert!(result.best_fitness > 0.5);
}

#[test]
fn test_stop_from_another_thread() {
    let options = EvolutionOptions::builder()
        .population_size(50)
        .selection_pressure(0.2)
        .mutation_rate(1.0)
        .seed(6)
        .build();
    // Full mutation keeps the run from ever converging on its own.
    let mut controller =
        EvolutionController::new("Neither a borrower nor a lender be", &options).unwrap();
    let stop = controller.stop_handle();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        stop.stop();
    });
    let result = controller.run(None).unwrap();
    stopper.join().unwrap();

    assert_eq!(result.termination, TerminationReason::Interrupted);
    assert!(result.best_fitness < 0.95);
}

#[test]
fn test_target_outside_alphabet() {
    let result = evolve("ABBA!", &ab_options(1), None);

    match result {
        Err(GeneticError::Validation { invalid }) => {
            assert!(invalid.contains(&'!'));
            assert_eq!(invalid.len(), 1);
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_non_ascii_target_reports_every_symbol() {
    let options = EvolutionOptions::builder().seed(1).build();

    match evolve("naïve café", &options, None) {
        Err(GeneticError::Validation { invalid }) => {
            assert_eq!(invalid.into_iter().collect::<Vec<_>>(), vec!['é', 'ï']);
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_selection_pressure_too_low() {
    let options = EvolutionOptions::builder()
        .population_size(4)
        .selection_pressure(0.2)
        .build();

    match evolve("abc", &options, None) {
        Err(GeneticError::Configuration(msg)) => {
            assert!(msg.contains("no parents"), "{}", msg);
        }
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_zero_population_size() {
    let options = EvolutionOptions::builder().population_size(0).build();

    assert!(matches!(
        evolve("abc", &options, None),
        Err(GeneticError::Configuration(_))
    ));
}

#[test]
fn test_run_emits_tracing_events() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let mut options = ab_options(3);
    options.set_max_generations(Some(50));
    let result = tracing::subscriber::with_default(subscriber, || evolve("AB", &options, None))
        .unwrap();

    let text = logs.text();
    assert!(text.contains("starting evolution"), "{}", text);
    assert!(text.contains("evaluated generation"), "{}", text);
    assert!(text.contains("adaptive_rate"), "{}", text);
    assert!(text.contains("evolution finished"), "{}", text);
    assert_eq!(
        text.matches("evaluated generation").count(),
        result.generations_run + 1
    );
}
