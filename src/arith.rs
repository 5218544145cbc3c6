//! The big-integer operations the rest of the crate is written against.
//!
//! Plain `add`/`sub`/`mul` and comparisons come straight from `num-bigint`; this module adds
//! the modular pieces on top of them.

use num::Integer;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ArithError {
    #[error("no modular inverse exists: operands are not coprime")]
    NoInverse,
}

/// Mathematical modulus: the result is in `[0, n-1]` even when `a` is negative.
///
/// `n` must be non-zero.
pub fn mod_floor(a: &BigInt, n: &BigUint) -> BigUint {
    let n = BigInt::from(n.clone());
    // a positive modulus always yields a non-negative result, so the sign can be dropped
    let (_, magnitude) = a.mod_floor(&n).into_parts();
    magnitude
}

/// `base^exp mod modulus` by repeated squaring.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    if modulus.is_one() {
        return BigUint::zero();
    }
    let mut result = BigUint::one();
    let mut base = base % modulus;
    for i in 0..exp.bits() {
        if exp.bit(i) {
            result = &result * &base % modulus;
        }
        base = &base * &base % modulus;
    }
    result
}

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let t = &a % &b;
        a = b;
        b = t;
    }
    a
}

/// Inverse of `a` modulo `n` via the extended Euclidean algorithm.
pub fn mod_inverse(a: &BigUint, n: &BigUint) -> Result<BigUint, ArithError> {
    if n.is_zero() {
        return Err(ArithError::NoInverse);
    }
    let (mut old_r, mut r) = (BigInt::from(a % n), BigInt::from(n.clone()));
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }
    if !old_r.is_one() {
        return Err(ArithError::NoInverse);
    }
    Ok(mod_floor(&old_s, n))
}

/// Uniformly random value below `2^bits`; the top bit may come out zero.
pub fn random_bits<R: RngCore + CryptoRng>(rng: &mut R, bits: u64) -> BigUint {
    rng.gen_biguint(bits)
}

/// Uniformly random value in `[0, bound)`. Panics if `bound` is zero.
pub fn random_below<R: RngCore + CryptoRng>(rng: &mut R, bound: &BigUint) -> BigUint {
    rng.gen_biguint_below(bound)
}

/// Uniformly random value in `[low, high)`.
pub fn random_range<R: RngCore + CryptoRng>(rng: &mut R, low: &BigUint, high: &BigUint) -> BigUint {
    rng.gen_biguint_range(low, high)
}
