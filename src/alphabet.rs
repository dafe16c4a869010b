//! # Alphabet
//!
//! The fixed symbol set candidates are drawn from. The standard alphabet is
//! ASCII letters, punctuation, digits and whitespace. Custom alphabets are
//! supported (tests use tiny ones to keep the search space small) but must be
//! non-empty and ASCII-only, so a candidate is always a valid UTF-8 byte string.
//!
//! ## Example
//!
//! ```rust
//! use hamlet_evolver::alphabet::Alphabet;
//!
//! let alphabet = Alphabet::standard();
//! assert!(alphabet.validate("To be, or not to be").is_ok());
//!
//! let offending = alphabet.validate("naïve").unwrap_err();
//! assert!(offending.contains(&'ï'));
//! ```

use std::collections::BTreeSet;

use crate::{
    error::{GeneticError, Result},
    rng::RandomNumberGenerator,
};

const WHITESPACE: &[u8] = b" \t\n\r\x0b\x0c";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
    members: [bool; 128],
}

impl Alphabet {
    /// ASCII letters, punctuation, digits and the six ASCII whitespace symbols.
    pub fn standard() -> Self {
        let mut symbols: Vec<u8> = Vec::with_capacity(100);
        symbols.extend(b'a'..=b'z');
        symbols.extend(b'A'..=b'Z');
        symbols.extend((0x21u8..=0x7e).filter(|b| b.is_ascii_punctuation()));
        symbols.extend(b'0'..=b'9');
        symbols.extend_from_slice(WHITESPACE);
        Self::from_symbols(symbols)
    }

    /// Builds an alphabet from an explicit symbol set. Duplicates are collapsed
    /// and order of first appearance is kept.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` if `symbols` is empty or contains
    /// a non-ASCII character.
    pub fn new(symbols: &str) -> Result<Self> {
        if symbols.is_empty() {
            return Err(GeneticError::Configuration(
                "Alphabet cannot be empty".to_string(),
            ));
        }

        if let Some(c) = symbols.chars().find(|c| !c.is_ascii()) {
            return Err(GeneticError::Configuration(format!(
                "Alphabet symbols must be ASCII, found {:?}",
                c
            )));
        }

        let mut seen = BTreeSet::new();
        let unique: Vec<u8> = symbols.bytes().filter(|b| seen.insert(*b)).collect();
        Ok(Self::from_symbols(unique))
    }

    fn from_symbols(symbols: Vec<u8>) -> Self {
        let mut members = [false; 128];
        for &s in &symbols {
            members[s as usize] = true;
        }
        Self { symbols, members }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.contains_byte(c as u8)
    }

    pub fn contains_byte(&self, b: u8) -> bool {
        self.members.get(b as usize).copied().unwrap_or(false)
    }

    /// Draws one symbol uniformly.
    pub fn sample(&self, rng: &mut RandomNumberGenerator) -> u8 {
        self.symbols[rng.gen_index(self.symbols.len())]
    }

    /// Checks that every character of `text` belongs to the alphabet.
    ///
    /// On failure returns the set of offending characters. This is a
    /// precondition check for diagnostics, it is never called inside the
    /// search loop.
    pub fn validate(&self, text: &str) -> std::result::Result<(), BTreeSet<char>> {
        let invalid: BTreeSet<char> = text.chars().filter(|&c| !self.contains(c)).collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(invalid)
        }
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::standard()
    }
}
