mod arith;
mod attack;
mod ciphertext;
mod decryption;
mod error;
mod frequency;
mod prime;
mod rsa;
mod session;

pub use arith::{abs_difference, exponent_difference, greatest_common_divisor, mod_inverse};
pub use attack::{
    attack, letter_hypothesis, recover_key, AttackConfig, HypothesisPair, KeyGuess,
    LetterHypothesis, RecoveredKey, DEFAULT_EXPONENTS,
};
pub use ciphertext::{CipherElement, Ciphertext};
pub use decryption::{DecryptionMap, UNMAPPED};
pub use error::{AttackFailure, KeyError, OverrideError};
pub use frequency::{
    frequency_table, ngram_table, FrequencyEntry, FrequencyTable, NgramEntry,
    ENGLISH_LETTER_FREQUENCIES,
};
pub use prime::{find_factor_pair, is_likely_prime};
pub use rsa::{
    decrypt_text, encrypt_text, generate_key_pair, generate_random_key_pair, rsa_apply,
    RsaKeyPair, MAX_LETTER_CODE,
};
pub use session::AnalysisSession;
