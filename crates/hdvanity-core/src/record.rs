//! Wallet records handed to the outside world

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hdvanity_crypto::{encoding::wif_decode, EncryptedKey, EncryptionError};

const PLAINTEXT_TAG: &str = "plain:";

/// A private key as it leaves the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum ProtectedKey {
    Encrypted(EncryptedKey),
    /// WIF key, only produced when the plaintext fallback is enabled
    Plaintext(String),
}

impl ProtectedKey {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, ProtectedKey::Encrypted(_))
    }
}

impl fmt::Display for ProtectedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtectedKey::Encrypted(key) => write!(f, "{}", key),
            ProtectedKey::Plaintext(wif) => write!(f, "{}{}", PLAINTEXT_TAG, wif),
        }
    }
}

impl FromStr for ProtectedKey {
    type Err = EncryptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(PLAINTEXT_TAG) {
            Some(wif) => {
                wif_decode(wif).map_err(|e| EncryptionError::Malformed(format!("plaintext key: {}", e)))?;
                Ok(ProtectedKey::Plaintext(wif.to_string()))
            }
            None => Ok(ProtectedKey::Encrypted(s.parse()?)),
        }
    }
}

/// One exported wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Wallet index under the account
    pub index: u32,
    /// `"<index>"`, or `"<index>:<pattern>"` for vanity matches
    pub label: String,
    pub private_key: ProtectedKey,
    pub address: String,
}

impl WalletRecord {
    pub fn label_for(index: u32, pattern: Option<&str>) -> String {
        match pattern {
            Some(pattern) => format!("{}:{}", index, pattern),
            None => index.to_string(),
        }
    }

    /// Recover the index from a label written by [`label_for`](Self::label_for)
    pub fn index_from_label(label: &str) -> Option<u32> {
        let digits = label.split_once(':').map_or(label, |(index, _)| index);
        digits.parse().ok()
    }
}
