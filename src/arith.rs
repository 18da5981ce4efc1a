// Arbitrary precision helpers shared by key generation and the attack.

use num_bigint::BigUint;
use num_traits::{One, Zero};

pub fn greatest_common_divisor(mut a: BigUint, mut b: BigUint) -> BigUint {
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Find `d` such that `(d * e) mod modulus == 1`.
///
/// Returns `None` when `e` and `modulus` are not coprime, or the modulus is
/// too small for an inverse to mean anything.
pub fn mod_inverse(e: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    if modulus <= &BigUint::one() {
        return None;
    }
    if greatest_common_divisor(e.clone(), modulus.clone()) != BigUint::one() {
        return None;
    }
    e.modinv(modulus)
}

pub fn abs_difference(a: &BigUint, b: &BigUint) -> BigUint {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

/// `|block - code^e|`, computed without a modulus.
///
/// For a block encrypted as `code^e mod n` the true modulus `n` divides this
/// value, which is what makes the GCD step of the attack work. Expect the
/// result to have roughly `e * log2(code)` bits.
pub fn exponent_difference(block: &BigUint, code: u32, e: u32) -> BigUint {
    let power = BigUint::from(code).pow(e);
    abs_difference(block, &power)
}
