use crate::arith;
use num::Integer;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use std::time::Instant;

/// Miller-Rabin rounds used when the caller does not pick a count.
pub const DEFAULT_ITERATIONS: usize = 20;

// cheap filter applied to candidates before running Miller-Rabin on them
const SMALL_PRIMES: [u32; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PrimeError {
    #[error("cannot generate a prime of {0} bits")]
    BitSizeTooSmall(u64),
    #[error("no {bits}-bit prime found after {attempts} candidates")]
    Exhausted { bits: u64, attempts: usize },
}

pub struct Verification;

impl Verification {
    /// Probabilistic primality check with the thread-local CSPRNG and default rounds.
    pub fn is_prime(n: &BigUint) -> bool {
        Self::is_probable_prime(n, DEFAULT_ITERATIONS, &mut rand::thread_rng())
    }

    /// Miller-Rabin test. A composite slips through with probability at most
    /// `4^-iterations`; primes are never rejected.
    pub fn is_probable_prime<R: RngCore + CryptoRng>(
        n: &BigUint,
        iterations: usize,
        rng: &mut R,
    ) -> bool {
        let two = BigUint::from(2u32);
        let three = BigUint::from(3u32);
        if n <= &three {
            return n == &two || n == &three;
        }
        if n.is_even() {
            return false;
        }

        let n_minus_one = n - 1u32;
        let (r, d) = Self::decompose(&n_minus_one);

        'witness: for _ in 0..iterations {
            // a in [2, n-2]
            let a = arith::random_range(rng, &two, &n_minus_one);
            let mut x = arith::mod_pow(&a, &d, n);
            if x.is_one() || x == n_minus_one {
                continue;
            }
            for _ in 1..r {
                x = &x * &x % n;
                if x == n_minus_one {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }

    /// Splits `value` into `(r, d)` with `value = 2^r * d` and `d` odd.
    /// Zero has no such form and comes back as `(0, 0)`.
    pub fn decompose(value: &BigUint) -> (u64, BigUint) {
        match value.trailing_zeros() {
            Some(r) => (r, value >> r),
            None => (0, BigUint::zero()),
        }
    }

    fn has_small_factor(n: &BigUint) -> bool {
        SMALL_PRIMES.iter().any(|&q| {
            let q = BigUint::from(q);
            // the small prime itself is not a composite
            n != &q && (n % &q).is_zero()
        })
    }
}

pub struct Generation;

impl Generation {
    /// Samples odd `bit_size`-bit candidates until one passes Miller-Rabin, giving up after
    /// `max_attempts` candidates. The top bit is forced so the result has exactly
    /// `bit_size` bits.
    pub fn generate_large_prime<R: RngCore + CryptoRng>(
        bit_size: u64,
        iterations: usize,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<BigUint, PrimeError> {
        if bit_size < 2 {
            return Err(PrimeError::BitSizeTooSmall(bit_size));
        }
        let start = Instant::now();
        for attempt in 1..=max_attempts {
            let mut candidate = arith::random_bits(rng, bit_size);
            candidate.set_bit(0, true);
            candidate.set_bit(bit_size - 1, true);

            if Verification::has_small_factor(&candidate) {
                continue;
            }
            if Verification::is_probable_prime(&candidate, iterations, rng) {
                log::info!(
                    "found {}-bit prime after {} candidates in {:?}",
                    bit_size,
                    attempt,
                    start.elapsed()
                );
                return Ok(candidate);
            }
        }
        log::warn!("gave up on {}-bit prime after {} candidates", bit_size, max_attempts);
        Err(PrimeError::Exhausted { bits: bit_size, attempts: max_attempts })
    }
}
