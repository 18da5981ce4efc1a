// Recover an RSA private key from letter-by-letter ciphertext.
//
// Each block is `code^e mod n` for the code of a single letter. If we can
// guess which letter a block encrypts, then for the right exponent `e`
//
//   block ≡ code^e (mod n)
//
// so `n` divides `|block - code^e|`. Guessing two blocks (the two most
// frequent ones are very likely 'E' and 'T' in English text) gives two such
// numbers, and their GCD is `n` or a small multiple of it. With `n` in hand
// we factor it by trial division, which is fine because the moduli here are
// tiny, derive `d` from the totient, and check the guess by decrypting the
// hypothesised blocks again.
//
// The exponent is unknown too, so we repeat this for a fixed list of likely
// public exponents and take the first that validates.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rayon::prelude::*;

use crate::{
    exponent_difference, find_factor_pair, frequency_table, greatest_common_divisor,
    mod_inverse, rsa_apply, AttackFailure, Ciphertext, DecryptionMap, FrequencyTable,
    ENGLISH_LETTER_FREQUENCIES,
};

pub const DEFAULT_EXPONENTS: [u32; 15] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 65537,
];
const MIN_HYPOTHESIS_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackConfig {
    /// Public exponents to try, in order.
    pub exponents: Vec<u32>,
    /// How many of the most frequent blocks to pair with English letters.
    pub hypothesis_size: usize,
    /// Small factors the GCD may carry on top of the true modulus.
    pub cofactor_divisors: Vec<u64>,
    /// Candidate moduli must be strictly larger than this to hold every
    /// letter code.
    pub min_modulus: u64,
    /// Maximum odd trial divisors per candidate modulus. `None` searches all
    /// the way to the square root.
    pub factor_search_limit: Option<u64>,
}

impl Default for AttackConfig {
    /// Tries every exponent in [`DEFAULT_EXPONENTS`]. When no smaller exponent
    /// validates, most of the time goes to 65537, whose GCD works on numbers
    /// several hundred thousand bits wide and can take seconds. Trim
    /// `exponents` for interactive use.
    fn default() -> Self {
        Self {
            exponents: DEFAULT_EXPONENTS.to_vec(),
            hypothesis_size: MIN_HYPOTHESIS_SIZE,
            cofactor_divisors: vec![2, 3, 5, 7],
            min_modulus: u64::from(crate::MAX_LETTER_CODE),
            factor_search_limit: Some(1_000_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HypothesisPair {
    pub block: BigUint,
    pub letter: char,
}

impl HypothesisPair {
    pub fn code(&self) -> u32 {
        self.letter as u32
    }
}

/// Guessed plaintext letters for the most frequent blocks, most frequent
/// first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterHypothesis {
    pairs: Vec<HypothesisPair>,
}

impl LetterHypothesis {
    pub fn pairs(&self) -> &[HypothesisPair] {
        &self.pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGuess {
    pub e: BigUint,
    pub n: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    pub phi: BigUint,
    pub d: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredKey {
    pub key: KeyGuess,
    pub hypothesis: LetterHypothesis,
    /// Every distinct block of the ciphertext decrypted with the key.
    pub decryption: DecryptionMap,
}

/// Pair the `k` most frequent blocks with the `k` most frequent English
/// letters, by position only.
pub fn letter_hypothesis(
    table: &FrequencyTable,
    k: usize,
) -> Result<LetterHypothesis, AttackFailure> {
    if k < MIN_HYPOTHESIS_SIZE {
        return Err(AttackFailure::HypothesisTooSmall(k));
    }
    if k > ENGLISH_LETTER_FREQUENCIES.len() {
        return Err(AttackFailure::HypothesisTooLarge(k));
    }
    if table.len() < k {
        return Err(AttackFailure::InsufficientUniqueBlocks {
            found: table.len(),
            needed: k,
        });
    }

    let pairs = table
        .top(k)
        .iter()
        .zip(ENGLISH_LETTER_FREQUENCIES)
        .map(|(entry, (letter, _))| HypothesisPair {
            block: entry.block.clone(),
            letter,
        })
        .collect();
    Ok(LetterHypothesis { pairs })
}

/// Search the configured exponents for a key consistent with `hypothesis`.
pub fn recover_key(
    hypothesis: &LetterHypothesis,
    config: &AttackConfig,
) -> Result<KeyGuess, AttackFailure> {
    for &e in &config.exponents {
        if let Some(key) = try_exponent(e, hypothesis, config) {
            log::info!(
                "recovered key e={}, n={} = {} * {}, d={}",
                key.e,
                key.n,
                key.p,
                key.q,
                key.d
            );
            return Ok(key);
        }
    }
    Err(AttackFailure::NoConsistentKey {
        exponents_tried: config.exponents.len(),
    })
}

/// Run the full attack: frequency analysis, letter hypothesis, key recovery,
/// then decryption of every distinct block with the recovered key.
pub fn attack(
    ciphertext: &Ciphertext,
    config: &AttackConfig,
) -> Result<RecoveredKey, AttackFailure> {
    let table = frequency_table(ciphertext);
    let hypothesis = letter_hypothesis(&table, config.hypothesis_size)?;
    let key = recover_key(&hypothesis, config)?;
    let decryption = DecryptionMap::from_key(ciphertext, &key.d, &key.n);
    Ok(RecoveredKey {
        key,
        hypothesis,
        decryption,
    })
}

fn try_exponent(e: u32, hypothesis: &LetterHypothesis, config: &AttackConfig) -> Option<KeyGuess> {
    // Each difference is an independent big power, up to hundreds of
    // thousands of bits for e = 65537.
    let differences: Vec<BigUint> = hypothesis
        .pairs()
        .par_iter()
        .map(|pair| exponent_difference(&pair.block, pair.code(), e))
        .filter(|difference| !difference.is_zero())
        .collect();
    if differences.len() < 2 {
        log::debug!("e={e}: only {} usable equations", differences.len());
        return None;
    }

    let gcd = differences.into_iter().reduce(greatest_common_divisor)?;
    log::debug!("e={e}: gcd of differences is {gcd}");

    let e = BigUint::from(e);
    candidate_moduli(&gcd, config)
        .into_iter()
        .find_map(|n| derive_key(&e, n, hypothesis, config))
}

/// The GCD and the GCD with each small cofactor divided out, dropping any
/// that are too small to carry a letter.
fn candidate_moduli(gcd: &BigUint, config: &AttackConfig) -> Vec<BigUint> {
    let min_modulus = BigUint::from(config.min_modulus);
    std::iter::once(gcd.clone())
        .chain(config.cofactor_divisors.iter().filter_map(|&divisor| {
            let divisor = BigUint::from(divisor);
            if divisor.is_zero() || !(gcd % &divisor).is_zero() {
                return None;
            }
            Some(gcd / divisor)
        }))
        .filter(|n| n > &min_modulus)
        .collect()
}

fn derive_key(
    e: &BigUint,
    n: BigUint,
    hypothesis: &LetterHypothesis,
    config: &AttackConfig,
) -> Option<KeyGuess> {
    let Some((p, q)) = find_factor_pair(&n, config.factor_search_limit) else {
        log::debug!("e={e}: candidate modulus {n} could not be factored");
        return None;
    };

    let one = BigUint::one();
    let phi = (&p - &one) * (&q - &one);
    if greatest_common_divisor(e.clone(), phi.clone()) != one {
        log::debug!("e={e}: not coprime with phi={phi} of candidate {n}");
        return None;
    }
    let d = mod_inverse(e, &phi)?;

    let validated = hypothesis
        .pairs()
        .iter()
        .all(|pair| rsa_apply(&d, &n, &pair.block) == BigUint::from(pair.code()));
    if !validated {
        log::debug!("e={e}: d={d} with n={n} does not reproduce the hypothesis");
        return None;
    }

    Some(KeyGuess {
        e: e.clone(),
        n,
        p,
        q,
        phi,
        d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{encrypt_text, generate_key_pair, CipherElement};

    // E is the most frequent letter and T the second.
    const PLAINTEXT: &str =
        "Meet me at the tree by the gate at ten, she said. The teeth of the beast are sharp!";

    fn big(value: u64) -> BigUint {
        BigUint::from(value)
    }

    fn small_exponents() -> AttackConfig {
        AttackConfig {
            exponents: vec![3, 5, 7, 11, 13],
            ..AttackConfig::default()
        }
    }

    #[test]
    fn attack_recovers_17_19_key() {
        let keys = generate_key_pair(17, 19).unwrap();
        let ciphertext = encrypt_text(PLAINTEXT, &keys.public, &keys.n);

        let recovered = attack(&ciphertext, &AttackConfig::default()).unwrap();

        assert_eq!(
            recovered.key,
            KeyGuess {
                e: big(5),
                n: big(323),
                p: big(17),
                q: big(19),
                phi: big(288),
                d: big(173),
            }
        );
        assert_eq!(
            recovered.decryption.render(&ciphertext),
            PLAINTEXT.to_ascii_uppercase()
        );
    }

    #[test]
    fn hypothesis_pairs_top_blocks_with_e_and_t() {
        let keys = generate_key_pair(17, 19).unwrap();
        let ciphertext = encrypt_text(PLAINTEXT, &keys.public, &keys.n);

        let hypothesis = letter_hypothesis(&frequency_table(&ciphertext), 2).unwrap();

        assert_eq!(
            hypothesis.pairs(),
            &[
                HypothesisPair {
                    block: big(103),
                    letter: 'E'
                },
                HypothesisPair {
                    block: big(50),
                    letter: 'T'
                },
            ]
        );
    }

    #[test]
    fn modulus_is_recovered_when_gcd_carries_a_factor_of_two() {
        // For this text the GCD at e = 5 is 646 = 2 * 323.
        let hypothesis = LetterHypothesis {
            pairs: vec![
                HypothesisPair {
                    block: big(103),
                    letter: 'E',
                },
                HypothesisPair {
                    block: big(50),
                    letter: 'T',
                },
            ],
        };
        let gcd = greatest_common_divisor(
            exponent_difference(&big(103), 'E' as u32, 5),
            exponent_difference(&big(50), 'T' as u32, 5),
        );
        assert_eq!(gcd, big(646));

        let key = recover_key(&hypothesis, &small_exponents()).unwrap();

        assert_eq!(key.n, big(323));
        assert_eq!(key.e, big(5));
    }

    #[test]
    fn single_unique_block_is_insufficient() {
        let ciphertext = encrypt_text("EEE EE", &big(5), &big(323));

        assert_eq!(
            attack(&ciphertext, &AttackConfig::default()),
            Err(AttackFailure::InsufficientUniqueBlocks {
                found: 1,
                needed: 2
            })
        );
    }

    #[test]
    fn empty_ciphertext_is_insufficient() {
        let ciphertext = Ciphertext::new(vec![CipherElement::Passthrough(' ')]);

        assert_eq!(
            attack(&ciphertext, &AttackConfig::default()),
            Err(AttackFailure::InsufficientUniqueBlocks {
                found: 0,
                needed: 2
            })
        );
    }

    #[test]
    fn wrong_letter_guess_finds_no_key() {
        // The most frequent letters are A and B, so guessing E and T is wrong.
        let ciphertext = encrypt_text("AAAA BBB C", &big(5), &big(323));

        assert_eq!(
            attack(&ciphertext, &small_exponents()),
            Err(AttackFailure::NoConsistentKey { exponents_tried: 5 })
        );
    }

    #[test]
    fn exponent_outside_the_list_finds_no_key() {
        let config = AttackConfig {
            exponents: vec![3, 7, 13],
            ..AttackConfig::default()
        };
        let keys = generate_key_pair(17, 19).unwrap();
        let ciphertext = encrypt_text(PLAINTEXT, &keys.public, &keys.n);

        assert_eq!(
            attack(&ciphertext, &config),
            Err(AttackFailure::NoConsistentKey { exponents_tried: 3 })
        );
    }

    #[test]
    fn zero_difference_leaves_too_few_equations() {
        // A block equal to 69^3 gives K = 0 for 'E' at e = 3, which is dropped,
        // leaving one equation and no GCD to take.
        let block = big(69).pow(3);
        assert!(exponent_difference(&block, 'E' as u32, 3).is_zero());
        let hypothesis = LetterHypothesis {
            pairs: vec![
                HypothesisPair {
                    block,
                    letter: 'E',
                },
                HypothesisPair {
                    block: big(50),
                    letter: 'T',
                },
            ],
        };
        let config = AttackConfig {
            exponents: vec![3],
            ..AttackConfig::default()
        };

        assert_eq!(
            recover_key(&hypothesis, &config),
            Err(AttackFailure::NoConsistentKey { exponents_tried: 1 })
        );
    }

    #[test]
    fn hypothesis_size_must_be_at_least_two() {
        let table = frequency_table(&encrypt_text("ETA", &big(5), &big(323)));

        assert_eq!(
            letter_hypothesis(&table, 1),
            Err(AttackFailure::HypothesisTooSmall(1))
        );
        assert_eq!(
            letter_hypothesis(&table, 27),
            Err(AttackFailure::HypothesisTooLarge(27))
        );
    }

    #[test]
    fn larger_hypothesis_also_validates() {
        let keys = generate_key_pair(17, 19).unwrap();
        // E: 5, T: 4, A: 3
        let ciphertext = encrypt_text("EEEEE TTTT AAA", &keys.public, &keys.n);
        let config = AttackConfig {
            hypothesis_size: 3,
            ..small_exponents()
        };

        let recovered = attack(&ciphertext, &config).unwrap();

        assert_eq!(recovered.key.n, big(323));
        assert_eq!(recovered.key.d, big(173));
        assert_eq!(recovered.hypothesis.pairs().len(), 3);
    }

    #[test]
    fn candidate_moduli_divide_out_small_cofactors() {
        let config = AttackConfig::default();

        let candidates = candidate_moduli(&big(323 * 6), &config);

        assert_eq!(candidates, vec![big(1938), big(969), big(646)]);
    }

    #[test]
    fn candidate_moduli_drop_values_too_small_for_letters() {
        let config = AttackConfig::default();

        assert!(candidate_moduli(&big(34), &config).is_empty());
        // 182 / 7 = 26 is dropped, 182 / 2 = 91 is just large enough.
        assert_eq!(candidate_moduli(&big(182), &config), vec![big(182), big(91)]);
    }
}
