// Error types returned by key generation, the attack, and decryption-map edits.

use num_bigint::BigUint;
use thiserror::Error;

/// Reasons a pair of primes cannot be turned into a usable key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("{0} is not a valid prime: p and q must both be greater than 1")]
    InvalidPrime(u64),

    #[error("p and q must be different primes, both were {0}")]
    NotDistinct(u64),

    #[error("modulus {0} is too small to encode every letter, it must exceed 90")]
    ModulusTooSmall(BigUint),

    #[error("{0} is not prime")]
    NotPrime(u64),

    #[error("could not draw two distinct primes from the requested range")]
    NoPrimesInRange,
}

/// Reasons the letter-frequency attack could not recover a key.
///
/// None of these are fatal: the caller may retry with more ciphertext or a
/// different hypothesis size.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttackFailure {
    #[error("hypothesis size {0} is too small, at least two letters are needed")]
    HypothesisTooSmall(usize),

    #[error("hypothesis size {0} exceeds the 26 letters of the alphabet")]
    HypothesisTooLarge(usize),

    #[error("insufficient unique blocks: found {found}, need {needed}")]
    InsufficientUniqueBlocks { found: usize, needed: usize },

    #[error("no consistent key found after trying {exponents_tried} public exponents")]
    NoConsistentKey { exponents_tried: usize },
}

/// Rejected manual edits of a decryption map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverrideError {
    #[error("'{0}' is not a letter")]
    NotALetter(char),

    #[error("block {0} does not occur in the ciphertext")]
    UnknownBlock(BigUint),
}
