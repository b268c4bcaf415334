//! Session configuration and run modes

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use hdvanity_crypto::cipher::DEFAULT_LOG_N;
use hdvanity_wallet::{CredentialPolicy, Network, StretchParams};

use crate::error::{Error, Result};
use crate::search::SearchConfig;

/// Fixed credentials used by [`RunMode::Debug`]
pub const DEBUG_SECRET: &str = "https://github.com/aiportal";
pub const DEBUG_SALT: &str = "gowallet";

/// How a session obtains and reports its credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Caller supplies the credentials
    #[default]
    Standard,
    /// Caller supplies the credentials; they are echoed at debug level
    Trace,
    /// Fixed test credentials under a length-only policy
    Debug,
}

impl RunMode {
    /// Pick the credentials this mode runs with
    pub fn resolve(self, supplied: Option<Credentials>) -> Result<Credentials> {
        match self {
            RunMode::Debug => Ok(Credentials::new(DEBUG_SECRET, DEBUG_SALT)),
            RunMode::Standard | RunMode::Trace => supplied.ok_or(Error::MissingCredentials(self)),
        }
    }

    /// Policy in effect for this mode
    pub fn policy(self, configured: CredentialPolicy) -> CredentialPolicy {
        match self {
            // The fixed debug secret has no uppercase or digit
            RunMode::Debug => CredentialPolicy::length_only(),
            RunMode::Standard | RunMode::Trace => configured,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Standard => write!(f, "standard"),
            RunMode::Trace => write!(f, "trace"),
            RunMode::Debug => write!(f, "debug"),
        }
    }
}

/// Secret and salt as entered, possibly with `\xHH` escapes
#[derive(Clone)]
pub struct Credentials {
    pub secret: Zeroizing<String>,
    pub salt: Zeroizing<String>,
}

impl Credentials {
    pub fn new(secret: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            salt: Zeroizing::new(salt.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret", &"<redacted>")
            .field("salt", &"<redacted>")
            .finish()
    }
}

/// Everything a [`Session`](crate::Session) needs besides credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub run_mode: RunMode,
    /// Seed stretching cost
    pub stretch: StretchParams,
    pub policy: CredentialPolicy,
    pub network: Network,
    /// Hardened account index under the master key
    pub account_index: u32,
    /// scrypt cost for private key encryption
    pub encryption_log_n: u8,
    /// Encryption passphrase; the salt is used when unset
    pub passphrase: Option<String>,
    /// Emit labelled plaintext keys when encryption fails instead of erroring
    pub allow_plaintext_fallback: bool,
    pub search: SearchConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Standard,
            stretch: StretchParams::standard(),
            policy: CredentialPolicy::strict(),
            network: Network::Mainnet,
            account_index: 0,
            encryption_log_n: DEFAULT_LOG_N,
            passphrase: None,
            allow_plaintext_fallback: false,
            search: SearchConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}
