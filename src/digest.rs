use md5::Md5;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use std::fmt;

/// Selects both the key size and the hash function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// 2048-bit modulus, SHA-256.
    Secure,
    /// 512-bit modulus, MD5. Deliberately weak.
    #[default]
    Insecure,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Secure => Mode::Insecure,
            Mode::Insecure => Mode::Secure,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Secure => f.write_str("secure"),
            Mode::Insecure => f.write_str("insecure"),
        }
    }
}

/// Hashes `bytes` and reads the hash output as a big-endian unsigned integer.
///
/// The result is not reduced modulo anything; a 512-bit modulus is still wider than both
/// hash outputs, so this only matters for very small test domains.
pub fn digest(bytes: &[u8], mode: Mode) -> BigUint {
    match mode {
        Mode::Secure => BigUint::from_bytes_be(&Sha256::digest(bytes)),
        Mode::Insecure => BigUint::from_bytes_be(&Md5::digest(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Num;

    #[test]
    fn secure_digest_is_sha256() {
        let expected = BigUint::from_str_radix(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            16,
        )
        .unwrap();
        assert_eq!(digest(b"abc", Mode::Secure), expected);
    }

    #[test]
    fn insecure_digest_is_md5() {
        let expected = BigUint::from_str_radix("900150983cd24fb0d6963f7d28e17f72", 16).unwrap();
        assert_eq!(digest(b"abc", Mode::Insecure), expected);
    }

    #[test]
    fn digest_width_follows_mode() {
        let data = b"the quick brown fox";
        assert!(digest(data, Mode::Secure).bits() <= 256);
        assert!(digest(data, Mode::Insecure).bits() <= 128);
        assert_ne!(digest(data, Mode::Secure), digest(data, Mode::Insecure));
    }

    #[test]
    fn empty_input_still_hashes() {
        let expected = BigUint::from_str_radix("d41d8cd98f00b204e9800998ecf8427e", 16).unwrap();
        assert_eq!(digest(b"", Mode::Insecure), expected);
    }

    #[test]
    fn toggling_flips_mode() {
        assert_eq!(Mode::Secure.toggled(), Mode::Insecure);
        assert_eq!(Mode::Insecure.toggled().toggled(), Mode::Insecure);
    }
}
