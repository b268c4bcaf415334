//! Passphrase-based private key encryption.
//!
//! Envelope layout before Base58Check:
//!
//! ```text
//! version (1) | log_n (1) | salt (16) | ciphertext + tag
//! ```
//!
//! The key and nonce for ChaCha20-Poly1305 come from
//! `scrypt(passphrase, salt, 2^log_n, 8, 1)`; the 18-byte header is bound
//! as associated data, so changing the cost or the salt fails decryption.

use std::fmt;
use std::str::FromStr;

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::encoding::{base58check_decode_raw, base58check_encode_raw};
use crate::stretch::scrypt_bytes;

const ENVELOPE_VERSION: u8 = 0x01;
const SALT_LEN: usize = 16;
const HEADER_LEN: usize = 2 + SALT_LEN;
const TAG_LEN: usize = 16;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Default scrypt cost for key encryption (N = 2^14)
pub const DEFAULT_LOG_N: u8 = 14;
/// Highest cost accepted when reading an envelope
pub const MAX_LOG_N: u8 = 22;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("Passphrase is empty")]
    EmptyPassphrase,
    #[error("Nothing to encrypt")]
    EmptyKey,
    #[error("Random source unavailable: {0}")]
    RandomSource(String),
    #[error("Key derivation failed: {0}")]
    Kdf(String),
    #[error("Malformed encrypted key: {0}")]
    Malformed(String),
    #[error("Integrity check failed (wrong passphrase or corrupted key)")]
    Integrity,
}

/// An encrypted private key in its printable form
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncryptedKey(String);

impl EncryptedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scrypt cost recorded in the envelope
    pub fn log_n(&self) -> Result<u8, EncryptionError> {
        Ok(Envelope::parse(&self.0)?.log_n)
    }
}

impl fmt::Display for EncryptedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EncryptedKey {
    type Err = EncryptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Envelope::parse(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for EncryptedKey {
    type Error = EncryptionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Envelope::parse(&s)?;
        Ok(Self(s))
    }
}

impl From<EncryptedKey> for String {
    fn from(key: EncryptedKey) -> Self {
        key.0
    }
}

struct Envelope {
    header: [u8; HEADER_LEN],
    log_n: u8,
    salt: [u8; SALT_LEN],
    ciphertext: Vec<u8>,
}

impl Envelope {
    fn parse(s: &str) -> Result<Self, EncryptionError> {
        let data = base58check_decode_raw(s).map_err(|e| EncryptionError::Malformed(e.to_string()))?;
        if data.len() <= HEADER_LEN + TAG_LEN {
            return Err(EncryptionError::Malformed("envelope too short".into()));
        }
        if data[0] != ENVELOPE_VERSION {
            return Err(EncryptionError::Malformed(format!("unknown version {}", data[0])));
        }
        let log_n = data[1];
        if log_n == 0 || log_n > MAX_LOG_N {
            return Err(EncryptionError::Malformed(format!("scrypt cost 2^{} out of range", log_n)));
        }

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&data[..HEADER_LEN]);
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&data[2..HEADER_LEN]);

        Ok(Self {
            header,
            log_n,
            salt,
            ciphertext: data[HEADER_LEN..].to_vec(),
        })
    }
}

/// Encrypts and decrypts private keys under a passphrase
#[derive(Debug, Clone, Copy)]
pub struct KeyEncryptor {
    log_n: u8,
}

impl Default for KeyEncryptor {
    fn default() -> Self {
        Self { log_n: DEFAULT_LOG_N }
    }
}

impl KeyEncryptor {
    pub fn new(log_n: u8) -> Self {
        Self { log_n }
    }

    pub fn log_n(&self) -> u8 {
        self.log_n
    }

    /// Encrypt `key` under `passphrase` with a fresh random salt
    pub fn encrypt(&self, key: &[u8], passphrase: &str) -> Result<EncryptedKey, EncryptionError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| EncryptionError::RandomSource(e.to_string()))?;
        self.encrypt_with_salt(key, passphrase, &salt)
    }

    /// Deterministic encryption for a caller-chosen salt
    pub fn encrypt_with_salt(
        &self,
        key: &[u8],
        passphrase: &str,
        salt: &[u8; SALT_LEN],
    ) -> Result<EncryptedKey, EncryptionError> {
        if passphrase.is_empty() {
            return Err(EncryptionError::EmptyPassphrase);
        }
        if key.is_empty() {
            return Err(EncryptionError::EmptyKey);
        }
        if self.log_n == 0 || self.log_n > MAX_LOG_N {
            return Err(EncryptionError::Kdf(format!("scrypt cost 2^{} out of range", self.log_n)));
        }

        let mut header = [0u8; HEADER_LEN];
        header[0] = ENVELOPE_VERSION;
        header[1] = self.log_n;
        header[2..].copy_from_slice(salt);

        let cipher = cipher_for(passphrase, salt, self.log_n)?;
        let ciphertext = cipher
            .0
            .encrypt(Nonce::from_slice(&cipher.1[..]), Payload { msg: key, aad: &header })
            .map_err(|_| EncryptionError::Kdf("cipher rejected input".into()))?;

        let mut data = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        data.extend_from_slice(&header);
        data.extend_from_slice(&ciphertext);
        Ok(EncryptedKey(base58check_encode_raw(&data)))
    }

    /// Decrypt with the cost and salt stored in the envelope
    pub fn decrypt(
        &self,
        encrypted: &EncryptedKey,
        passphrase: &str,
    ) -> Result<Zeroizing<Vec<u8>>, EncryptionError> {
        if passphrase.is_empty() {
            return Err(EncryptionError::EmptyPassphrase);
        }
        let envelope = Envelope::parse(encrypted.as_str())?;
        let cipher = cipher_for(passphrase, &envelope.salt, envelope.log_n)?;
        cipher
            .0
            .decrypt(
                Nonce::from_slice(&cipher.1[..]),
                Payload { msg: &envelope.ciphertext, aad: &envelope.header },
            )
            .map(Zeroizing::new)
            .map_err(|_| EncryptionError::Integrity)
    }
}

fn cipher_for(
    passphrase: &str,
    salt: &[u8; SALT_LEN],
    log_n: u8,
) -> Result<(ChaCha20Poly1305, Zeroizing<[u8; 12]>), EncryptionError> {
    let derived = scrypt_bytes::<44>(passphrase.as_bytes(), salt, log_n, SCRYPT_R, SCRYPT_P)
        .map_err(|e| EncryptionError::Kdf(e.to_string()))?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&derived[..32]));
    let mut nonce = Zeroizing::new([0u8; 12]);
    nonce.copy_from_slice(&derived[32..]);
    Ok((cipher, nonce))
}
