//! Extraction code generation.

use rand::Rng;

/// The 62-character case-sensitive alphanumeric alphabet.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Produces unguessable extraction codes of a configured length.
///
/// Codes are drawn uniformly from the alphanumeric alphabet with the OS
/// CSPRNG, rejection-sampled until they contain at least one letter and
/// one digit so a code is never mistaken for a plain word or number.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    /// Code length in characters.
    length: usize,
}

impl CodeGenerator {
    /// Creates a generator for codes of `length` characters.
    ///
    /// Lengths below 2 cannot hold both a letter and a digit and are
    /// rejected up front.
    pub fn new(length: usize) -> Self {
        assert!(length >= 2, "code length must be at least 2");
        Self { length }
    }

    /// Generates one code.
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code: String = (0..self.length)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                .collect();

            let has_letter = code.chars().any(|c| c.is_ascii_alphabetic());
            let has_digit = code.chars().any(|c| c.is_ascii_digit());
            if has_letter && has_digit {
                return code;
            }
        }
    }

    /// Configured code length.
    pub fn length(&self) -> usize {
        self.length
    }
}
