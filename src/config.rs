use crate::digest::Mode;
use crate::primes;

/// Tunables for key generation and signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeConfig {
    /// Modulus size used in [`Mode::Secure`].
    pub secure_bits: u64,
    /// Modulus size used in [`Mode::Insecure`].
    pub insecure_bits: u64,
    /// Miller-Rabin rounds per candidate.
    pub primality_iterations: usize,
    /// Candidates tried before prime generation gives up.
    pub max_prime_attempts: usize,
    /// Nonces tried before signing gives up.
    pub max_nonce_attempts: usize,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        SchemeConfig {
            secure_bits: 2048,
            insecure_bits: 512,
            primality_iterations: primes::DEFAULT_ITERATIONS,
            max_prime_attempts: 100_000,
            max_nonce_attempts: 10_000,
        }
    }
}

impl SchemeConfig {
    pub fn bits_for(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Secure => self.secure_bits,
            Mode::Insecure => self.insecure_bits,
        }
    }
}
