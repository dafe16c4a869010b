//! # Mutation Rate Schedule
//!
//! Derives a per-symbol mutation probability from the best fitness seen so far.
//! The adaptive curve for a base rate `r` is
//!
//! - `f < 0.3`: `2r`
//! - `0.3 <= f < 0.7`: `r * (2 - (f - 0.3) / 0.4)`, decaying from `2r` to `r`
//! - `f >= 0.7`: `r * (1 - (f - 0.7) / 0.3)`, decaying from `r` to zero at `f = 1`
//!
//! and is precomputed into a 1001-entry table so lookups in the generation
//! loop are a single index.
//!
//! ```rust
//! use hamlet_evolver::mutation_rate::MutationRateTable;
//!
//! let table = MutationRateTable::new(0.05);
//! assert_eq!(table.rate(0.0), 0.1);
//! assert_eq!(table.rate(0.7), 0.05);
//! ```

use serde::{Deserialize, Serialize};

/// Number of buckets in the lookup table (step 0.001 over `[0, 1]`).
pub const TABLE_SIZE: usize = 1001;

/// How reproduction picks its mutation rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MutationMode {
    /// The configured rate is applied to every child of every generation.
    #[default]
    Static,
    /// Each generation looks up one rate from the adaptive table at the
    /// current best fitness and applies it to all of that generation's children.
    Adaptive,
}

/// Immutable, precomputed adaptive mutation curve.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRateTable {
    base_rate: f64,
    rates: Box<[f64]>,
}

impl MutationRateTable {
    pub fn new(base_rate: f64) -> Self {
        let rates = (0..TABLE_SIZE)
            .map(|i| curve(base_rate, i as f64 / 1000.0))
            .collect();

        Self { base_rate, rates }
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    /// Rate for `fitness`, bucketed by `round(fitness * 1000)` clamped to `[0, 1000]`.
    pub fn rate(&self, fitness: f64) -> f64 {
        self.rates[bucket(fitness)]
    }
}

fn bucket(fitness: f64) -> usize {
    if fitness.is_nan() {
        return 0;
    }
    (fitness * 1000.0).round().clamp(0.0, (TABLE_SIZE - 1) as f64) as usize
}

fn curve(base_rate: f64, f: f64) -> f64 {
    if f < 0.3 {
        base_rate * 2.0
    } else if f < 0.7 {
        base_rate * (2.0 - (f - 0.3) / 0.4)
    } else {
        (base_rate * (1.0 - (f - 0.7) / 0.3)).max(0.0)
    }
}

/// Resolves the rate reproduction uses for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationSchedule {
    mode: MutationMode,
    table: MutationRateTable,
}

impl MutationSchedule {
    pub fn new(mode: MutationMode, base_rate: f64) -> Self {
        Self {
            mode,
            table: MutationRateTable::new(base_rate),
        }
    }

    pub fn mode(&self) -> MutationMode {
        self.mode
    }

    pub fn table(&self) -> &MutationRateTable {
        &self.table
    }

    /// What the adaptive curve suggests at `best_fitness`, whatever the mode.
    pub fn adaptive_rate(&self, best_fitness: f64) -> f64 {
        self.table.rate(best_fitness)
    }

    /// The rate to apply to the next generation's children.
    pub fn rate_for(&self, best_fitness: f64) -> f64 {
        match self.mode {
            MutationMode::Static => self.table.base_rate(),
            MutationMode::Adaptive => self.table.rate(best_fitness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_table_boundaries() {
        let r = 0.06;
        let table = MutationRateTable::new(r);

        assert!((table.rate(0.0) - 2.0 * r).abs() < EPS);
        assert!((table.rate(0.3) - 2.0 * r).abs() < EPS);
        assert!((table.rate(0.7) - r).abs() < EPS);
        assert!(table.rate(1.0).abs() < EPS);
    }

    #[test]
    fn test_table_is_monotone_non_increasing() {
        let table = MutationRateTable::new(0.1);

        for i in 1..TABLE_SIZE {
            let prev = table.rate((i - 1) as f64 / 1000.0);
            let next = table.rate(i as f64 / 1000.0);
            assert!(next <= prev + EPS, "rate rose at bucket {}", i);
        }
    }

    #[test]
    fn test_lookup_matches_curve_midpoints() {
        let r = 0.02;
        let table = MutationRateTable::new(r);

        assert!((table.rate(0.5) - r * 1.5).abs() < EPS);
        assert!((table.rate(0.85) - r * 0.5).abs() < EPS);
    }

    #[test]
    fn test_out_of_range_fitness_is_clamped() {
        let table = MutationRateTable::new(0.1);

        assert_eq!(table.rate(-3.0), table.rate(0.0));
        assert_eq!(table.rate(7.0), table.rate(1.0));
        assert_eq!(table.rate(f64::NAN), table.rate(0.0));
    }

    #[test]
    fn test_bucket_rounds_to_nearest() {
        assert_eq!(bucket(0.4996), 500);
        assert_eq!(bucket(0.4994), 499);
    }

    #[test]
    fn test_schedule_modes() {
        let fixed = MutationSchedule::new(MutationMode::Static, 0.04);
        assert_eq!(fixed.rate_for(0.0), 0.04);
        assert_eq!(fixed.rate_for(0.99), 0.04);
        assert!((fixed.adaptive_rate(0.0) - 0.08).abs() < EPS);

        let adaptive = MutationSchedule::new(MutationMode::Adaptive, 0.04);
        assert!((adaptive.rate_for(0.1) - 0.08).abs() < EPS);
        assert!(adaptive.rate_for(1.0).abs() < EPS);
    }
}
