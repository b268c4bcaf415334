//! BIP32 hierarchical private key derivation.

use thiserror::Error;

use hdvanity_crypto::{
    encoding::base58check_encode_raw,
    hash::{hash160, hmac_sha512},
    Secp256k1Keypair,
};

use crate::traits::{AddressError, Network};

/// First hardened child index
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("Seed must be 16 to 64 bytes, got {0}")]
    InvalidSeedLength(usize),
    #[error("Seed produces an invalid master key")]
    InvalidMasterKey,
    #[error("Child index {index} yields an invalid key")]
    InvalidChildKey { index: u32 },
    #[error("Account index {0} is outside the hardened range")]
    AccountIndexOutOfRange(u32),
    #[error("Wallet index {0} is hardened; wallets use normal indices")]
    HardenedWalletIndex(u32),
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// An extended private key: keypair plus BIP32 chain metadata
#[derive(Clone, Debug)]
pub struct ExtendedKey {
    keypair: Secp256k1Keypair,
    chain_code: [u8; 32],
    depth: u8,
    index: u32,
    parent_fingerprint: [u8; 4],
}

impl ExtendedKey {
    /// Master key from seed bytes: `HMAC-SHA512("Bitcoin seed", seed)`
    pub fn master_from_seed(seed: &[u8]) -> Result<Self, DerivationError> {
        if !(16..=64).contains(&seed.len()) {
            return Err(DerivationError::InvalidSeedLength(seed.len()));
        }

        let i = hmac_sha512(MASTER_HMAC_KEY, &[seed]);
        let (key, chain_code) = split_hmac(&i);
        let keypair = Secp256k1Keypair::from_bytes(&key).map_err(|_| DerivationError::InvalidMasterKey)?;

        Ok(Self {
            keypair,
            chain_code,
            depth: 0,
            index: 0,
            parent_fingerprint: [0; 4],
        })
    }

    /// Derive the child at `index`; indices at or above [`HARDENED_OFFSET`]
    /// are hardened.
    pub fn derive_child(&self, index: u32) -> Result<Self, DerivationError> {
        let index_be = index.to_be_bytes();
        let i = if index >= HARDENED_OFFSET {
            let private_key = zeroize::Zeroizing::new(self.keypair.private_key_bytes());
            hmac_sha512(&self.chain_code, &[&[0u8][..], &private_key[..], &index_be[..]])
        } else {
            hmac_sha512(&self.chain_code, &[&self.keypair.public_key_compressed()[..], &index_be[..]])
        };

        let (tweak, chain_code) = split_hmac(&i);
        let keypair = self
            .keypair
            .tweak_add(&tweak)
            .map_err(|_| DerivationError::InvalidChildKey { index })?;

        Ok(Self {
            keypair,
            chain_code,
            depth: self.depth.saturating_add(1),
            index,
            parent_fingerprint: self.fingerprint(),
        })
    }

    /// First four bytes of HASH160 of the compressed public key
    pub fn fingerprint(&self) -> [u8; 4] {
        let h = hash160(&self.keypair.public_key_compressed());
        [h[0], h[1], h[2], h[3]]
    }

    pub fn keypair(&self) -> &Secp256k1Keypair {
        &self.keypair
    }

    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.keypair.private_key_bytes()
    }

    pub fn public_key(&self) -> [u8; 33] {
        self.keypair.public_key_compressed()
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// Base58Check `xprv`/`tprv` serialization
    pub fn to_xprv(&self, network: Network) -> String {
        let private_key = zeroize::Zeroizing::new(self.keypair.private_key_bytes());
        let mut key_data = zeroize::Zeroizing::new([0u8; 33]);
        key_data[1..].copy_from_slice(&private_key[..]);
        self.serialize(network.xprv_version(), &key_data)
    }

    /// Base58Check `xpub`/`tpub` serialization
    pub fn to_xpub(&self, network: Network) -> String {
        self.serialize(network.xpub_version(), &self.keypair.public_key_compressed())
    }

    fn serialize(&self, version: [u8; 4], key_data: &[u8; 33]) -> String {
        let mut data = zeroize::Zeroizing::new(Vec::with_capacity(78));
        data.extend_from_slice(&version);
        data.push(self.depth);
        data.extend_from_slice(&self.parent_fingerprint);
        data.extend_from_slice(&self.index.to_be_bytes());
        data.extend_from_slice(&self.chain_code);
        data.extend_from_slice(key_data);
        base58check_encode_raw(&data)
    }
}

fn split_hmac(i: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&i[..32]);
    right.copy_from_slice(&i[32..]);
    (left, right)
}

/// The hardened top-level key all wallets are derived from
#[derive(Clone, Debug)]
pub struct Account {
    key: ExtendedKey,
    account_index: u32,
}

impl Account {
    /// Derive `m / account_index'`
    pub fn from_master(master: &ExtendedKey, account_index: u32) -> Result<Self, DerivationError> {
        if account_index >= HARDENED_OFFSET {
            return Err(DerivationError::AccountIndexOutOfRange(account_index));
        }
        let key = master.derive_child(HARDENED_OFFSET | account_index)?;
        Ok(Self { key, account_index })
    }

    pub fn key(&self) -> &ExtendedKey {
        &self.key
    }

    pub fn account_index(&self) -> u32 {
        self.account_index
    }

    /// Extended public key for display
    pub fn xpub(&self, network: Network) -> String {
        self.key.to_xpub(network)
    }

    /// Private key of wallet `index` (non-hardened child of the account)
    pub fn derive_wallet_key(&self, index: u32) -> Result<ExtendedKey, DerivationError> {
        if index >= HARDENED_OFFSET {
            return Err(DerivationError::HardenedWalletIndex(index));
        }
        self.key.derive_child(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP32 test vector 1
    const VECTOR1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn vector1_master() -> ExtendedKey {
        ExtendedKey::master_from_seed(&hex::decode(VECTOR1_SEED).unwrap()).unwrap()
    }

    #[test]
    fn test_vector1_master() {
        let master = vector1_master();
        assert_eq!(
            master.to_xprv(Network::Mainnet),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
        assert_eq!(
            master.to_xpub(Network::Mainnet),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
    }

    #[test]
    fn test_vector1_hardened_child() {
        let account = Account::from_master(&vector1_master(), 0).unwrap();
        assert_eq!(
            account.xpub(Network::Mainnet),
            "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw"
        );
        assert_eq!(account.key().depth(), 1);
        assert_eq!(account.key().index(), HARDENED_OFFSET);
        assert_eq!(account.key().parent_fingerprint(), vector1_master().fingerprint());
    }

    #[test]
    fn test_vector1_normal_child() {
        // m/0'/1
        let account = Account::from_master(&vector1_master(), 0).unwrap();
        let child = account.derive_wallet_key(1).unwrap();
        assert_eq!(
            child.to_xpub(Network::Mainnet),
            "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ"
        );
    }

    #[test]
    fn test_seed_length_bounds() {
        assert_eq!(
            ExtendedKey::master_from_seed(&[1u8; 15]).unwrap_err(),
            DerivationError::InvalidSeedLength(15)
        );
        assert_eq!(
            ExtendedKey::master_from_seed(&[1u8; 65]).unwrap_err(),
            DerivationError::InvalidSeedLength(65)
        );
        assert!(ExtendedKey::master_from_seed(&[1u8; 64]).is_ok());
    }

    #[test]
    fn test_index_range_checks() {
        let master = vector1_master();
        assert_eq!(
            Account::from_master(&master, HARDENED_OFFSET).unwrap_err(),
            DerivationError::AccountIndexOutOfRange(HARDENED_OFFSET)
        );
        let account = Account::from_master(&master, 0).unwrap();
        assert_eq!(
            account.derive_wallet_key(HARDENED_OFFSET).unwrap_err(),
            DerivationError::HardenedWalletIndex(HARDENED_OFFSET)
        );
    }

    #[test]
    fn test_derivation_is_pure() {
        let account = Account::from_master(&vector1_master(), 3).unwrap();
        let a = account.derive_wallet_key(42).unwrap();
        let b = account.derive_wallet_key(42).unwrap();
        assert_eq!(a.private_key_bytes(), b.private_key_bytes());
        assert_eq!(a.chain_code(), b.chain_code());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let master = vector1_master();
        let rendered = format!("{:?}", master);
        assert!(!rendered.contains(&hex::encode(master.private_key_bytes())));
    }
}
