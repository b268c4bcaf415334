//! Error taxonomy for the engine

use thiserror::Error;

use hdvanity_crypto::{EncryptionError, StretchError};
use hdvanity_pattern::PatternError;
use hdvanity_wallet::{AddressError, DerivationError, SeedError};

use crate::config::RunMode;
use crate::export::ExportError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid secret: {0}")]
    InvalidSecret(String),
    #[error("Invalid salt: {0}")]
    InvalidSalt(String),
    #[error("Key stretching failed: {0}")]
    Stretch(#[from] StretchError),
    #[error("Key derivation failed: {0}")]
    Derivation(DerivationError),
    #[error(transparent)]
    InvalidPublicKey(#[from] AddressError),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),
    #[error("Encryption failed: {0}")]
    Encryption(#[from] EncryptionError),
    #[error("Search exhausted after {scanned} indices: found {found} of {wanted} matches")]
    SearchExhausted { wanted: u32, found: u32, scanned: u64 },
    #[error("Worker pool failed: {0}")]
    WorkerPool(String),
    #[error("Credentials are required in {0} mode")]
    MissingCredentials(RunMode),
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<SeedError> for Error {
    fn from(err: SeedError) -> Self {
        match err {
            SeedError::InvalidSecret(reason) => Error::InvalidSecret(reason),
            SeedError::InvalidSalt(reason) => Error::InvalidSalt(reason),
            SeedError::Stretch(e) => Error::Stretch(e),
        }
    }
}

impl From<DerivationError> for Error {
    fn from(err: DerivationError) -> Self {
        match err {
            DerivationError::Address(e) => Error::InvalidPublicKey(e),
            other => Error::Derivation(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
