//! # Reproduction
//!
//! Selection of the breeding pool and production of the next generation.
pub mod breeding;
pub mod selection;

pub use breeding::Breeder;
pub use selection::TruncationSelection;
