use crate::arith::{self, ArithError};
use crate::config::SchemeConfig;
use crate::digest::Mode;
use crate::primes::{self, PrimeError};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::rc::Rc;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ElGamalError {
    #[error("the nonce has no inverse modulo p-1")]
    NoInverse,
    #[error("no invertible nonce found after {0} attempts")]
    NonceSearchExhausted(usize),
    #[error("the signature is malformed")]
    MalformedSignature,
    #[error("invalid domain parameters: {0}")]
    InvalidDomain(String),
    #[error(transparent)]
    Prime(#[from] PrimeError),
}

impl From<ArithError> for ElGamalError {
    fn from(err: ArithError) -> Self {
        match err {
            ArithError::NoInverse => ElGamalError::NoInverse,
        }
    }
}

#[derive(Debug)]
struct DomainParametersInternal {
    p: BigUint,
    g: BigUint,
    // p - 1, the modulus for exponents
    order: BigUint,
}

/// Prime modulus `p` and generator `g`. Cheap to clone; keys derived from the same
/// generation share one copy.
#[derive(Debug, Clone)]
pub struct Domain {
    parameters: Rc<DomainParametersInternal>,
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.parameters, &other.parameters)
            || (self.parameters.p == other.parameters.p && self.parameters.g == other.parameters.g)
    }
}

impl Domain {
    /// Checks `p` for primality and `1 < g < p`.
    pub fn new(p: BigUint, g: BigUint) -> Result<Self, ElGamalError> {
        if !primes::Verification::is_prime(&p) {
            return Err(ElGamalError::InvalidDomain(format!("{} is not prime", p)));
        }
        Self::with_prime(p, g)
    }

    // for a p that was just produced by the prime generator
    fn with_prime(p: BigUint, g: BigUint) -> Result<Self, ElGamalError> {
        if g <= BigUint::one() || g >= p {
            return Err(ElGamalError::InvalidDomain(format!(
                "generator {} is outside (1, {})",
                g, p
            )));
        }
        let order = &p - 1u32;
        Ok(Domain {
            parameters: Rc::new(DomainParametersInternal { p, g, order }),
        })
    }

    pub fn p(&self) -> &BigUint {
        &self.parameters.p
    }

    pub fn g(&self) -> &BigUint {
        &self.parameters.g
    }

    /// `p - 1`.
    pub fn order(&self) -> &BigUint {
        &self.parameters.order
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElGamalPublicKey {
    domain: Domain,
    public_value: BigUint,
}

impl ElGamalPublicKey {
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// `y = g^x mod p`.
    pub fn value(&self) -> &BigUint {
        &self.public_value
    }
}

#[derive(Clone)]
pub struct ElGamalPrivateKey {
    private_exponent: BigUint,
    public_key: ElGamalPublicKey,
}

impl ElGamalPrivateKey {
    /// Derives the public value from `private_exponent`, which must lie in `[1, p-2]`.
    pub fn new(domain: Domain, private_exponent: BigUint) -> Result<Self, ElGamalError> {
        if private_exponent.is_zero() || &private_exponent >= domain.order() {
            return Err(ElGamalError::InvalidDomain(
                "private exponent is outside [1, p-2]".to_string(),
            ));
        }
        let public_value = arith::mod_pow(domain.g(), &private_exponent, domain.p());
        Ok(ElGamalPrivateKey {
            private_exponent,
            public_key: ElGamalPublicKey { domain, public_value },
        })
    }

    pub fn get_public_key(&self) -> ElGamalPublicKey {
        self.public_key.clone()
    }

    pub fn domain(&self) -> &Domain {
        &self.public_key.domain
    }

    pub fn exponent(&self) -> &BigUint {
        &self.private_exponent
    }
}

// keep the exponent out of `{:?}` output
impl fmt::Debug for ElGamalPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElGamalPrivateKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalSignature {
    pub r: BigUint,
    pub s: BigUint,
}

impl fmt::Display for ElGamalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r: {:x}\ns: {:x}", self.r, self.s)
    }
}

pub struct ElGamalCryptosystem<R: RngCore + CryptoRng = rand::rngs::ThreadRng> {
    rng: R,
    config: SchemeConfig,
}

impl ElGamalCryptosystem {
    pub fn new(config: SchemeConfig) -> Self {
        ElGamalCryptosystem { rng: rand::thread_rng(), config }
    }
}

impl<R: RngCore + CryptoRng> ElGamalCryptosystem<R> {
    pub fn with_rng(config: SchemeConfig, rng: R) -> Self {
        ElGamalCryptosystem { rng, config }
    }

    pub fn config(&self) -> &SchemeConfig {
        &self.config
    }

    /// Fresh domain and keypair sized for `mode`. The generator is fixed at 2 and is not
    /// checked to generate a large subgroup.
    pub fn generate_keys(&mut self, mode: Mode) -> Result<ElGamalPrivateKey, ElGamalError> {
        let bits = self.config.bits_for(mode);
        if bits < 3 {
            // g = 2 needs p > 2
            return Err(ElGamalError::InvalidDomain(format!(
                "{}-bit modulus is too small",
                bits
            )));
        }
        let p = primes::Generation::generate_large_prime(
            bits,
            self.config.primality_iterations,
            self.config.max_prime_attempts,
            &mut self.rng,
        )?;
        let domain = Domain::with_prime(p, BigUint::from(2u32))?;
        let private_key = self.generate_private_key(&domain)?;
        log::debug!(
            "generated {} keys: p = {}, g = {}, y = {}",
            mode,
            domain.p(),
            domain.g(),
            private_key.public_key.public_value
        );
        Ok(private_key)
    }

    /// Private exponent uniform in `[1, p-2]` over an existing domain.
    pub fn generate_private_key(&mut self, domain: &Domain) -> Result<ElGamalPrivateKey, ElGamalError> {
        let x = arith::random_range(&mut self.rng, &BigUint::one(), domain.order());
        ElGamalPrivateKey::new(domain.clone(), x)
    }

    /// Signs `digest` with a fresh nonce. The digest is used as is, without reduction
    /// modulo `p-1`.
    pub fn sign(
        &mut self,
        digest: &BigUint,
        private_key: &ElGamalPrivateKey,
    ) -> Result<ElGamalSignature, ElGamalError> {
        let order = private_key.domain().order();
        for _ in 0..self.config.max_nonce_attempts {
            let k = arith::random_below(&mut self.rng, order);
            if arith::gcd(&k, order).is_one() {
                return sign_with_nonce(digest, private_key, &k);
            }
        }
        log::warn!(
            "no invertible nonce after {} attempts",
            self.config.max_nonce_attempts
        );
        Err(ElGamalError::NonceSearchExhausted(self.config.max_nonce_attempts))
    }

    pub fn verify(
        &self,
        digest: &BigUint,
        signature: &ElGamalSignature,
        public_key: &ElGamalPublicKey,
    ) -> Result<bool, ElGamalError> {
        verify(digest, signature, public_key)
    }
}

/// Deterministic half of signing. `k` must be invertible modulo `p-1` and must never be
/// used for a second signature.
pub fn sign_with_nonce(
    digest: &BigUint,
    private_key: &ElGamalPrivateKey,
    k: &BigUint,
) -> Result<ElGamalSignature, ElGamalError> {
    let domain = private_key.domain();
    let order = domain.order();

    let r = arith::mod_pow(domain.g(), k, domain.p());
    let k_inv = arith::mod_inverse(k, order)?;

    let x_r = BigInt::from(&private_key.private_exponent * &r);
    let s = arith::mod_floor(&(BigInt::from(k_inv) * (BigInt::from(digest.clone()) - x_r)), order);
    Ok(ElGamalSignature { r, s })
}

/// Checks `g^h = y^r * r^s (mod p)`.
pub fn verify(
    digest: &BigUint,
    signature: &ElGamalSignature,
    public_key: &ElGamalPublicKey,
) -> Result<bool, ElGamalError> {
    let ElGamalSignature { r, s } = signature;
    let domain = public_key.domain();
    let p = domain.p();
    if r.is_zero() || r >= p || s >= domain.order() {
        return Err(ElGamalError::MalformedSignature);
    }

    let lhs = arith::mod_pow(domain.g(), digest, p);
    let rhs = arith::mod_pow(&public_key.public_value, r, p) * arith::mod_pow(r, s, p) % p;
    Ok(lhs == rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn textbook_key() -> ElGamalPrivateKey {
        let domain = Domain::new(big(23), big(5)).unwrap();
        ElGamalPrivateKey::new(domain, big(7)).unwrap()
    }

    fn small_system(seed: u64) -> ElGamalCryptosystem<StdRng> {
        let config = SchemeConfig {
            secure_bits: 96,
            insecure_bits: 64,
            ..SchemeConfig::default()
        };
        ElGamalCryptosystem::with_rng(config, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn textbook_public_key() {
        assert_eq!(textbook_key().get_public_key().value(), &big(17));
    }

    #[test]
    fn textbook_signature_with_fixed_nonce() {
        let key = textbook_key();
        let signature = sign_with_nonce(&big(10), &key, &big(3)).unwrap();
        assert_eq!(signature, ElGamalSignature { r: big(10), s: big(2) });
        assert!(verify(&big(10), &signature, &key.get_public_key()).unwrap());
    }

    #[test]
    fn non_invertible_nonce_is_rejected() {
        assert_eq!(
            sign_with_nonce(&big(10), &textbook_key(), &big(4)).unwrap_err(),
            ElGamalError::NoInverse
        );
    }

    #[test]
    fn domain_rejects_bad_parameters() {
        assert!(matches!(Domain::new(big(21), big(2)), Err(ElGamalError::InvalidDomain(_))));
        assert!(matches!(Domain::new(big(23), big(1)), Err(ElGamalError::InvalidDomain(_))));
        assert!(matches!(Domain::new(big(23), big(23)), Err(ElGamalError::InvalidDomain(_))));
    }

    #[test]
    fn private_exponent_range_is_enforced() {
        let domain = Domain::new(big(23), big(5)).unwrap();
        assert!(ElGamalPrivateKey::new(domain.clone(), big(0)).is_err());
        assert!(ElGamalPrivateKey::new(domain.clone(), big(22)).is_err());
        assert!(ElGamalPrivateKey::new(domain, big(21)).is_ok());
    }

    #[test]
    fn generated_keys_satisfy_public_key_relation() {
        let mut system = small_system(21);
        for mode in [Mode::Insecure, Mode::Secure] {
            let key = system.generate_keys(mode).unwrap();
            let domain = key.domain();
            assert_eq!(domain.p().bits(), system.config().bits_for(mode));
            assert_eq!(domain.g(), &big(2));
            assert!(key.exponent() >= &big(1) && key.exponent() < domain.order());
            assert_eq!(
                key.get_public_key().value(),
                &arith::mod_pow(domain.g(), key.exponent(), domain.p())
            );
        }
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let mut system = small_system(22);
        let key = system.generate_keys(Mode::Insecure).unwrap();
        let public = key.get_public_key();
        let digest = big(0xdead_beef);
        let signature = system.sign(&digest, &key).unwrap();
        assert!(signature.r >= big(1) && &signature.r < key.domain().p());
        assert!(&signature.s < key.domain().order());
        assert!(system.verify(&digest, &signature, &public).unwrap());
        assert!(!system.verify(&(digest + 1u32), &signature, &public).unwrap());
    }

    #[test]
    fn zero_digest_signs_and_verifies() {
        let mut system = small_system(23);
        let key = system.generate_keys(Mode::Insecure).unwrap();
        let signature = system.sign(&BigUint::zero(), &key).unwrap();
        assert!(verify(&BigUint::zero(), &signature, &key.get_public_key()).unwrap());
    }

    #[test]
    fn malformed_signatures_are_errors() {
        let key = textbook_key();
        let public = key.get_public_key();
        for (r, s) in [(0, 5), (23, 5), (10, 22)] {
            let signature = ElGamalSignature { r: big(r), s: big(s) };
            assert_eq!(
                verify(&big(10), &signature, &public),
                Err(ElGamalError::MalformedSignature)
            );
        }
    }

    #[test]
    fn zero_nonce_attempts_exhausts() {
        let config = SchemeConfig { max_nonce_attempts: 0, ..SchemeConfig::default() };
        let mut system = ElGamalCryptosystem::with_rng(config, StdRng::seed_from_u64(24));
        assert_eq!(
            system.sign(&big(10), &textbook_key()).unwrap_err(),
            ElGamalError::NonceSearchExhausted(0)
        );
    }

    #[test]
    fn tiny_modulus_is_refused() {
        let config = SchemeConfig { insecure_bits: 2, ..SchemeConfig::default() };
        let mut system = ElGamalCryptosystem::with_rng(config, StdRng::seed_from_u64(25));
        assert!(matches!(
            system.generate_keys(Mode::Insecure),
            Err(ElGamalError::InvalidDomain(_))
        ));
    }
}
