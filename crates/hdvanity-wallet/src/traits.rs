//! Address encoder trait and network types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Bitcoin network selecting version bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    pub fn is_mainnet(self) -> bool {
        self == Network::Mainnet
    }

    pub fn xprv_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xAD, 0xE4],
            Network::Testnet => [0x04, 0x35, 0x83, 0x94],
        }
    }

    pub fn xpub_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xB2, 0x1E],
            Network::Testnet => [0x04, 0x35, 0x87, 0xCF],
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// Turns a public key into a printable address
pub trait AddressEncoder: Send + Sync {
    /// Human-readable name of the address format
    fn name(&self) -> &'static str;

    /// Encode a SEC1 public key (compressed or uncompressed)
    fn encode(&self, public_key: &[u8]) -> Result<String, AddressError>;

    /// Characters that can appear in an address (for pattern validation)
    fn valid_address_chars(&self) -> &'static str;

    /// Leading characters shared by every address (e.g. "1")
    fn address_prefix(&self) -> &'static str;

    /// Private key in the format wallets import
    fn export_private_key(&self, private_key: &[u8; 32]) -> String;
}
