//! HDVanity Wallet
//!
//! Brain-wallet seeds, BIP32 derivation and address encoding.

pub mod traits;
pub mod seed;
pub mod xkey;
pub mod bitcoin;
pub mod wallet;

pub use traits::{AddressEncoder, AddressError, Network};
pub use seed::{CredentialPolicy, Seed, SeedDeriver, SeedError, SEED_LEN};
pub use xkey::{Account, DerivationError, ExtendedKey, HARDENED_OFFSET};
pub use bitcoin::P2pkh;
pub use wallet::Wallet;

pub use hdvanity_crypto::StretchParams;

/// Derive the account key at `m / account_index'` straight from a seed
pub fn account_from_seed(seed: &Seed, account_index: u32) -> Result<Account, DerivationError> {
    let master = ExtendedKey::master_from_seed(seed.as_bytes())?;
    Account::from_master(&master, account_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST_SEED: &str = "02c96cb942f57a1689e343b04e44432e9e387a69d3cf8db08a043e52a1028f7b";

    fn fast_account() -> Account {
        let mut bytes = [0u8; SEED_LEN];
        hex::decode_to_slice(FAST_SEED, &mut bytes).unwrap();
        account_from_seed(&Seed::from_bytes(bytes), 0).unwrap()
    }

    #[test]
    fn test_account_keys() {
        let account = fast_account();
        assert_eq!(
            account.xpub(Network::Mainnet),
            "xpub68chftczNr4pd24s1ZfHbusWjh2nZJK6wmWfPJuzLuma7v5RZh4knFJkS9xAWjXLUQH61qtbF4LtJBGBCDgdCySbKnQP2V7zHBSuE2csgbD"
        );
        assert_eq!(
            account.key().to_xprv(Network::Mainnet),
            "xprv9udMGP66YUWXQXzPuY8HEmvnBfCJ9qbFaYb4avWNnaEbF7kH29kWESzGaqg3q9fKQbHp7768TnGNXi45u5DE2MzVk9JLA2e9wSmNx3PjmMV"
        );
    }

    #[test]
    fn test_first_wallets() {
        let account = fast_account();
        let encoder = P2pkh::default();
        let expected = [
            (
                "2897818db5dd938dbd04b4098e4ef558485c8420c0c1f0d4dff5bfc06bb6b056",
                "KxacgjWcnBwk1z4aDvGzB3gAJtEWX1hsoFt5EVfouWRR8qiKrNbr",
                "13zZGjyh1vPVikJ924sb7CWtU6yCjbn15y",
            ),
            (
                "6caa04fd21f29c70ce4d596d2e26ea10dd994798d3a25dad27f14f550ba0c203",
                "KzrwTdWDLAPaKiEqGk5D1MDLXZY8iX7tjPJKSvgHVASktuViXa9k",
                "1KvjetVmfHULYHSQiikGiYQuGo37nz1jE4",
            ),
            (
                "45f36c837ccc64f8352ab207f37368bd9ff5860ce225b98d2dfce36ed27aba06",
                "KyZgkmRxfqoUf6gfZCV3NroMjt7f7TCeGp11RFUej1nvQXLi6K3S",
                "1MHvimRKjammtyPgMVAhGFrmEHNb5W3vSm",
            ),
        ];

        for (i, (key_hex, wif, address)) in expected.iter().enumerate() {
            let wallet = Wallet::derive(&account, &encoder, i as u32).unwrap();
            assert_eq!(wallet.index, i as u32);
            assert_eq!(hex::encode(wallet.private_key_bytes()), *key_hex);
            assert_eq!(wallet.export_private_key(&encoder), *wif);
            assert_eq!(wallet.address, *address);
        }
    }
}
