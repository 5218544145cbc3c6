//! The interactive flow: pick a mode, load a file, sign it.

use crate::config::SchemeConfig;
use crate::digest::{self, Mode};
use crate::elgamal::{ElGamalCryptosystem, ElGamalError, ElGamalPrivateKey, ElGamalSignature};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("no file has been selected")]
    NoFileSelected,
    #[error("keys have not been generated yet")]
    KeyUnavailable,
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ElGamal(#[from] ElGamalError),
}

#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct SignedDocument {
    pub name: String,
    pub mode: Mode,
    pub digest: BigUint,
    pub signature: ElGamalSignature,
}

pub struct Session<R: RngCore + CryptoRng = rand::rngs::ThreadRng> {
    cryptosystem: ElGamalCryptosystem<R>,
    mode: Mode,
    keys: Option<ElGamalPrivateKey>,
    file: Option<LoadedFile>,
}

impl Session {
    pub fn new(config: SchemeConfig) -> Self {
        Session::with_cryptosystem(ElGamalCryptosystem::new(config))
    }
}

impl<R: RngCore + CryptoRng> Session<R> {
    /// Starts in [`Mode::Insecure`] with no keys and no file.
    pub fn with_cryptosystem(cryptosystem: ElGamalCryptosystem<R>) -> Self {
        Session {
            cryptosystem,
            mode: Mode::default(),
            keys: None,
            file: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn keys(&self) -> Option<&ElGamalPrivateKey> {
        self.keys.as_ref()
    }

    pub fn file(&self) -> Option<&LoadedFile> {
        self.file.as_ref()
    }

    /// Switches to `mode` and generates a fresh domain and keypair for it, replacing the
    /// previous ones even if the mode did not change. On failure the session keeps no keys.
    pub fn set_mode(&mut self, mode: Mode) -> Result<&ElGamalPrivateKey, SessionError> {
        self.mode = mode;
        self.keys = None;
        let keys = self.cryptosystem.generate_keys(mode)?;
        Ok(self.keys.insert(keys))
    }

    pub fn toggle_mode(&mut self) -> Result<&ElGamalPrivateKey, SessionError> {
        self.set_mode(self.mode.toggled())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&LoadedFile, SessionError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        log::info!("loaded {} ({} bytes)", name, bytes.len());
        Ok(self.load_bytes(name, bytes))
    }

    pub fn load_bytes(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> &LoadedFile {
        self.file.insert(LoadedFile { name: name.into(), bytes })
    }

    /// Digests the loaded file with the current mode's hash and signs it.
    pub fn sign(&mut self) -> Result<SignedDocument, SessionError> {
        let file = self.file.as_ref().ok_or(SessionError::NoFileSelected)?;
        let keys = self.keys.as_ref().ok_or(SessionError::KeyUnavailable)?;
        let digest = digest::digest(&file.bytes, self.mode);
        let signature = self.cryptosystem.sign(&digest, keys)?;
        log::info!("signed {} in {} mode", file.name, self.mode);
        Ok(SignedDocument {
            name: file.name.clone(),
            mode: self.mode,
            digest,
            signature,
        })
    }

    /// Checks `document` against the current public key.
    pub fn verify(&self, document: &SignedDocument) -> Result<bool, SessionError> {
        let keys = self.keys.as_ref().ok_or(SessionError::KeyUnavailable)?;
        Ok(self
            .cryptosystem
            .verify(&document.digest, &document.signature, &keys.get_public_key())?)
    }
}
