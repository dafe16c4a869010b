use super::FitnessEvaluator;
use crate::{
    candidate::Candidate,
    error::Result,
    fitness::{Scored, Target},
};

/// Scores one candidate at a time on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct SequentialEvaluator;

impl SequentialEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl FitnessEvaluator for SequentialEvaluator {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn evaluate(&mut self, population: &[Candidate], target: &Target) -> Result<Vec<Scored>> {
        Ok(population.iter().map(|c| target.evaluate(c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    #[test]
    fn test_scores_in_population_order() {
        let alphabet = Alphabet::new("AB").unwrap();
        let target = Target::new("AB", &alphabet).unwrap();
        let population: Vec<Candidate> = ["AB", "BB", "BA"]
            .iter()
            .map(|t| Candidate::from_text(t, &alphabet).unwrap())
            .collect();

        let scored = SequentialEvaluator::new()
            .evaluate(&population, &target)
            .unwrap();

        let fitness: Vec<f64> = scored.iter().map(|s| s.fitness).collect();
        assert_eq!(fitness, vec![1.0, 0.5, 0.0]);
        assert_eq!(scored[1].candidate, population[1]);
    }

    #[test]
    fn test_empty_population() {
        let alphabet = Alphabet::standard();
        let target = Target::new("x", &alphabet).unwrap();

        let scored = SequentialEvaluator::new().evaluate(&[], &target).unwrap();
        assert!(scored.is_empty());
    }
}
