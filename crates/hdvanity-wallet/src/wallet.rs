//! Leaf wallets derived from an account

use crate::traits::AddressEncoder;
use crate::xkey::{Account, DerivationError, ExtendedKey};

/// One derived wallet: index, key and address
#[derive(Debug, Clone)]
pub struct Wallet {
    pub index: u32,
    pub key: ExtendedKey,
    pub address: String,
}

impl Wallet {
    /// Derive wallet `index` under `account`
    pub fn derive(
        account: &Account,
        encoder: &dyn AddressEncoder,
        index: u32,
    ) -> Result<Self, DerivationError> {
        let key = account.derive_wallet_key(index)?;
        let address = encoder.encode(&key.public_key())?;
        Ok(Self { index, key, address })
    }

    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.key.private_key_bytes()
    }

    /// Private key in the encoder's import format (WIF for Bitcoin)
    pub fn export_private_key(&self, encoder: &dyn AddressEncoder) -> String {
        encoder.export_private_key(&self.key.private_key_bytes())
    }
}
