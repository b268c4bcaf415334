//! Brain-wallet seed derivation from a secret and a salt.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use hdvanity_crypto::stretch::{dual_stretch, StretchError, StretchParams};

/// Seed length in bytes
pub const SEED_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("Invalid secret: {0}")]
    InvalidSecret(String),
    #[error("Invalid salt: {0}")]
    InvalidSalt(String),
    #[error(transparent)]
    Stretch(#[from] StretchError),
}

/// Stretched master seed. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// Minimum-strength rules applied to credentials before any stretching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPolicy {
    /// Minimum secret length in bytes, after unescaping
    pub min_secret_len: usize,
    /// Require upper, lower, digit and special characters in the secret
    pub require_char_classes: bool,
    /// Minimum salt length in bytes, after unescaping
    pub min_salt_len: usize,
}

impl CredentialPolicy {
    pub const fn strict() -> Self {
        Self { min_secret_len: 16, require_char_classes: true, min_salt_len: 6 }
    }

    /// Same lengths as [`strict`](Self::strict), no character class rule
    pub const fn length_only() -> Self {
        Self { min_secret_len: 16, require_char_classes: false, min_salt_len: 6 }
    }

    pub fn check(&self, secret: &[u8], salt: &[u8]) -> Result<(), SeedError> {
        if secret.len() < self.min_secret_len {
            return Err(SeedError::InvalidSecret(format!(
                "must be at least {} characters, got {}",
                self.min_secret_len,
                secret.len()
            )));
        }

        if self.require_char_classes {
            let missing = missing_classes(secret);
            if !missing.is_empty() {
                return Err(SeedError::InvalidSecret(format!("missing {}", missing.join(", "))));
            }
        }

        if salt.len() < self.min_salt_len {
            return Err(SeedError::InvalidSalt(format!(
                "must be at least {} characters, got {}",
                self.min_salt_len,
                salt.len()
            )));
        }

        Ok(())
    }
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

fn missing_classes(secret: &[u8]) -> Vec<&'static str> {
    let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);
    for b in secret {
        match b {
            b'A'..=b'Z' => upper = true,
            b'a'..=b'z' => lower = true,
            b'0'..=b'9' => digit = true,
            _ => special = true,
        }
    }

    [
        (upper, "uppercase letter"),
        (lower, "lowercase letter"),
        (digit, "digit"),
        (special, "special character"),
    ]
    .into_iter()
    .filter(|(present, _)| !present)
    .map(|(_, name)| name)
    .collect()
}

/// Replace every `\xHH` sequence with the byte `0xHH`. Other backslashes
/// are kept as-is.
pub fn unescape(input: &str) -> Zeroizing<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Zeroizing::new(Vec::with_capacity(bytes.len()));
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && (bytes[i + 1] == b'x' || bytes[i + 1] == b'X') {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 2]), hex_val(bytes[i + 3])) {
                out.push(hi << 4 | lo);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Derives seeds under a fixed policy and stretch cost
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedDeriver {
    pub policy: CredentialPolicy,
    pub params: StretchParams,
}

impl SeedDeriver {
    pub fn new(policy: CredentialPolicy, params: StretchParams) -> Self {
        Self { policy, params }
    }

    /// Derive a seed from text credentials that may contain `\xHH` escapes
    pub fn derive(&self, secret: &str, salt: &str) -> Result<Seed, SeedError> {
        self.derive_bytes(&unescape(secret), &unescape(salt))
    }

    /// Derive a seed from raw credential bytes
    pub fn derive_bytes(&self, secret: &[u8], salt: &[u8]) -> Result<Seed, SeedError> {
        self.policy.check(secret, salt)?;
        let stretched = dual_stretch(secret, salt, &self.params)?;
        Ok(Seed(*stretched))
    }
}
