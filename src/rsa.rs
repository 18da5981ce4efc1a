// Toy RSA over single letters: key generation from two small primes, and
// encryption of text one letter per block.

use std::ops::RangeInclusive;

use num_bigint::BigUint;
use num_traits::One;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    greatest_common_divisor, is_likely_prime, mod_inverse, CipherElement, Ciphertext,
    DecryptionMap, KeyError,
};

/// The largest code a block must be able to carry: 'Z'.
pub const MAX_LETTER_CODE: u32 = 'Z' as u32;
const FIRST_PUBLIC_EXPONENT: u64 = 3;
const PRIMALITY_SEED: [u8; 32] = [101; 32];
const RANDOM_PRIME_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    pub public: BigUint,
    pub private: BigUint,
    pub n: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    pub totient: BigUint,
}

/// Build a key pair from two primes.
///
/// The public exponent is the smallest `e >= 3` coprime with the totient, so
/// `p = 17, q = 19` gives `e = 5, d = 173, n = 323`.
pub fn generate_key_pair(p: u64, q: u64) -> Result<RsaKeyPair, KeyError> {
    if p <= 1 {
        return Err(KeyError::InvalidPrime(p));
    }
    if q <= 1 {
        return Err(KeyError::InvalidPrime(q));
    }
    if p == q {
        return Err(KeyError::NotDistinct(p));
    }

    let big_p = BigUint::from(p);
    let big_q = BigUint::from(q);
    let n = &big_p * &big_q;
    if n <= BigUint::from(MAX_LETTER_CODE) {
        return Err(KeyError::ModulusTooSmall(n));
    }

    let mut rng = StdRng::from_seed(PRIMALITY_SEED);
    for (value, big_value) in [(p, &big_p), (q, &big_q)] {
        if !is_likely_prime(big_value, &mut rng) {
            return Err(KeyError::NotPrime(value));
        }
    }

    let one = BigUint::one();
    let totient = (&big_p - &one) * (&big_q - &one);
    let mut e = BigUint::from(FIRST_PUBLIC_EXPONENT);
    // Loop until gcd(e, totient) = 1. Terminates because totient + 1 is
    // always coprime with totient.
    loop {
        if greatest_common_divisor(e.clone(), totient.clone()) == one {
            if let Some(d) = mod_inverse(&e, &totient) {
                log::debug!("generated key e={e}, d={d}, n={n}");
                return Ok(RsaKeyPair {
                    public: e,
                    private: d,
                    n,
                    p: big_p,
                    q: big_q,
                    totient,
                });
            }
        }
        e += &one;
    }
}

/// Draw two distinct primes from `range` and build a key pair from them.
pub fn generate_random_key_pair<R: Rng>(
    range: RangeInclusive<u64>,
    rng: &mut R,
) -> Result<RsaKeyPair, KeyError> {
    if range.is_empty() {
        return Err(KeyError::NoPrimesInRange);
    }
    let mut primes: Vec<u64> = Vec::with_capacity(2);
    for _ in 0..RANDOM_PRIME_ATTEMPTS {
        let candidate = rng.gen_range(range.clone());
        if primes.contains(&candidate) || !is_likely_prime(&BigUint::from(candidate), rng) {
            continue;
        }
        primes.push(candidate);
        if primes.len() == 2 {
            match generate_key_pair(primes[0], primes[1]) {
                Ok(keys) => return Ok(keys),
                Err(KeyError::ModulusTooSmall(_)) => {
                    primes.clear();
                }
                Err(err) => return Err(err),
            }
        }
    }
    Err(KeyError::NoPrimesInRange)
}

/// `block^key mod n`, used for both encryption and decryption.
pub fn rsa_apply(key: &BigUint, n: &BigUint, block: &BigUint) -> BigUint {
    block.modpow(key, n)
}

/// Encrypt every letter of `plaintext` as its own block.
///
/// The text is upper-cased first; characters other than A-Z are kept as
/// passthrough elements.
pub fn encrypt_text(plaintext: &str, e: &BigUint, n: &BigUint) -> Ciphertext {
    plaintext
        .chars()
        .map(|ch| ch.to_ascii_uppercase())
        .map(|ch| {
            if ch.is_ascii_uppercase() {
                CipherElement::Block(rsa_apply(e, n, &BigUint::from(ch as u32)))
            } else {
                CipherElement::Passthrough(ch)
            }
        })
        .collect()
}

/// Decrypt a whole ciphertext with the private key. Blocks that do not
/// decrypt to a letter are shown as `_`.
pub fn decrypt_text(ciphertext: &Ciphertext, d: &BigUint, n: &BigUint) -> String {
    DecryptionMap::from_key(ciphertext, d, n).render(ciphertext)
}
