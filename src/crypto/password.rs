//! Password drawing
//!
//! Each character is an independent uniform draw over the alphabet;
//! repetition is allowed. The generator must be a `CryptoRng`, so a plain
//! statistical PRNG cannot be passed in by mistake.

use rand::{CryptoRng, Rng};

use crate::alphabet::Alphabet;

/// Draw `length` symbols from `alphabet`
///
/// # Example
/// ```
/// use pwforge::alphabet::{AlphabetKind, AlphabetRegistry};
/// use pwforge::crypto::password::draw_password;
///
/// let registry = AlphabetRegistry::default();
/// let hex = registry.lookup(AlphabetKind::Hex);
/// let password = draw_password(&mut rand::rng(), hex, 16);
/// assert_eq!(password.len(), 16);
/// assert!(hex.covers(&password));
/// ```
pub fn draw_password<R: CryptoRng>(rng: &mut R, alphabet: &Alphabet, length: usize) -> String {
    let symbols = alphabet.as_str().as_bytes();
    let mut password = String::with_capacity(length);

    for _ in 0..length {
        let idx = rng.random_range(0..symbols.len());
        password.push(symbols[idx] as char);
    }

    password
}
