//! ElGamal signatures over arbitrary-precision integers.
//!
//! Everything here is variable-time and built for study, not for protecting real secrets.

pub mod arith;
pub mod config;
pub mod digest;
pub mod elgamal;
pub mod primes;
pub mod session;

pub use config::SchemeConfig;
pub use digest::Mode;
pub use elgamal::{
    Domain, ElGamalCryptosystem, ElGamalError, ElGamalPrivateKey, ElGamalPublicKey,
    ElGamalSignature,
};
pub use session::{Session, SessionError, SignedDocument};
