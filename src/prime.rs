// Functions related to identification of primes and factoring small moduli.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, ToPrimitive, Zero};

const MILLER_RABIN_ROUNDS: u32 = 5;
const SMALL_ODD_PRIMES: [u64; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

pub fn is_likely_prime(candidate_prime: &BigUint, miller_rabin_rng: &mut impl RandBigInt) -> bool {
    let two = BigUint::from(2u64);
    if candidate_prime < &two {
        return false;
    }
    if candidate_prime == &two {
        return true;
    }
    if (candidate_prime % &two).is_zero() {
        return false;
    }

    for small_prime in SMALL_ODD_PRIMES {
        let x = BigUint::from(small_prime);
        if candidate_prime == &x {
            return true;
        }
        if (candidate_prime % &x).is_zero() {
            return false;
        }
    }

    // Anything with no factor up to 97 and below 97^2 is prime outright.
    let largest = SMALL_ODD_PRIMES[SMALL_ODD_PRIMES.len() - 1];
    if candidate_prime < &BigUint::from(largest * largest) {
        return true;
    }

    miller_rabin(candidate_prime, MILLER_RABIN_ROUNDS, miller_rabin_rng)
}

fn miller_rabin(candidate_prime: &BigUint, n_rounds: u32, rng: &mut impl RandBigInt) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u64);
    let n_minus_one = candidate_prime - &one;

    let mut d = n_minus_one.clone();
    let mut r = 0;
    while (&d % &two).is_zero() {
        d /= &two;
        r += 1;
    }

    'witness: for _ in 0..n_rounds {
        let a = rng.gen_biguint_range(&two, &(candidate_prime - &two));
        let mut x = a.modpow(&d, candidate_prime);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..(r - 1) {
            x = x.modpow(&two, candidate_prime);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Split `n` into `(i, n / i)` using the smallest odd divisor `i` with
/// `i * i <= n`.
///
/// `search_limit` caps the number of odd divisors tried. Returns `None` when
/// `n` has no odd divisor in range (it is prime, a power of two, or the
/// search ran out).
pub fn find_factor_pair(n: &BigUint, search_limit: Option<u64>) -> Option<(BigUint, BigUint)> {
    // Moduli that fit in a u64 take the fast path; the divisor never exceeds
    // 2^32 so i * i cannot overflow.
    if let Some(small_n) = n.to_u64() {
        return find_factor_pair_u64(small_n, search_limit)
            .map(|(p, q)| (BigUint::from(p), BigUint::from(q)));
    }

    let two = BigUint::from(2u64);
    let mut i = BigUint::from(3u64);
    let mut tried = 0u64;
    while &i * &i <= *n {
        if search_limit.is_some_and(|limit| tried >= limit) {
            log::warn!("gave up factoring {n} after {tried} trial divisions");
            return None;
        }
        if (n % &i).is_zero() {
            let cofactor = n / &i;
            return Some((i, cofactor));
        }
        i += &two;
        tried += 1;
    }
    None
}

fn find_factor_pair_u64(n: u64, search_limit: Option<u64>) -> Option<(u64, u64)> {
    let mut i = 3u64;
    let mut tried = 0u64;
    while i.checked_mul(i).is_some_and(|square| square <= n) {
        if search_limit.is_some_and(|limit| tried >= limit) {
            log::warn!("gave up factoring {n} after {tried} trial divisions");
            return None;
        }
        if n % i == 0 {
            log::trace!("{n} = {i} * {}", n / i);
            return Some((i, n / i));
        }
        i += 2;
        tried += 1;
    }
    None
}
