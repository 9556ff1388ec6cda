// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation with guaranteed character-class coverage.
//!
//! One character is drawn from each of the four classes, the remainder is
//! drawn uniformly from their union, and the result is shuffled so the
//! seeded positions carry no information.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};
use strum::Display;
use vaultguard_core::VaultError;

pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!@#$%^&*()_+~`|}{[]:;?><,./-=";

const CLASSES: [&[u8]; 4] = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS];

/// Shortest length that fits one character of every class.
pub const MIN_LENGTH: usize = CLASSES.len();

/// Length used when the caller does not ask for one.
pub const DEFAULT_LENGTH: usize = 12;

/// Coarse strength rating shown next to a generated password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

/// Rate a generated password by its length.
pub fn strength(length: usize) -> Strength {
    match length {
        0..8 => Strength::Weak,
        8..12 => Strength::Medium,
        _ => Strength::Strong,
    }
}

/// Generate a password of exactly `length` characters from the OS CSPRNG.
pub fn generate(length: usize) -> Result<String, VaultError> {
    generate_with(&mut OsRng, length)
}

/// Generate a password using the supplied cryptographically secure RNG.
pub fn generate_with<R: Rng + CryptoRng>(rng: &mut R, length: usize) -> Result<String, VaultError> {
    if length < MIN_LENGTH {
        return Err(VaultError::InvalidLength {
            length,
            min: MIN_LENGTH,
        });
    }

    let alphabet: Vec<u8> = CLASSES.concat();
    let mut chars: Vec<u8> = Vec::with_capacity(length);
    for class in CLASSES {
        chars.push(pick(rng, class));
    }
    while chars.len() < length {
        chars.push(pick(rng, &alphabet));
    }
    chars.shuffle(rng);

    Ok(chars.into_iter().map(char::from).collect())
}

fn pick<R: Rng>(rng: &mut R, set: &[u8]) -> u8 {
    set[rng.gen_range(0..set.len())]
}
