//! Sequential wallet generation

use tracing::info;

use hdvanity_wallet::{Account, AddressEncoder, DerivationError, Wallet, HARDENED_OFFSET};

/// Derives wallets `0..count` under an account
pub struct WalletGenerator<'a> {
    encoder: &'a dyn AddressEncoder,
}

impl<'a> WalletGenerator<'a> {
    pub fn new(encoder: &'a dyn AddressEncoder) -> Self {
        Self { encoder }
    }

    /// All `count` wallets in index order, or the first error; never a
    /// partial list.
    pub fn generate(&self, account: &Account, count: u32) -> Result<Vec<Wallet>, DerivationError> {
        if count > HARDENED_OFFSET {
            return Err(DerivationError::HardenedWalletIndex(HARDENED_OFFSET));
        }

        let wallets = (0..count)
            .map(|index| Wallet::derive(account, self.encoder, index))
            .collect::<Result<Vec<_>, _>>()?;

        info!(count, encoder = self.encoder.name(), "generated wallets");
        Ok(wallets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdvanity_wallet::{account_from_seed, P2pkh, Seed, SEED_LEN};

    fn account() -> Account {
        account_from_seed(&Seed::from_bytes([0x11; SEED_LEN]), 0).unwrap()
    }

    #[test]
    fn test_generate_in_order() {
        let encoder = P2pkh::default();
        let wallets = WalletGenerator::new(&encoder).generate(&account(), 5).unwrap();
        assert_eq!(wallets.len(), 5);
        for (i, wallet) in wallets.iter().enumerate() {
            assert_eq!(wallet.index, i as u32);
            assert!(wallet.address.starts_with('1'));
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let encoder = P2pkh::default();
        let generator = WalletGenerator::new(&encoder);
        let a = generator.generate(&account(), 4).unwrap();
        let b = generator.generate(&account(), 4).unwrap();
        let addresses = |ws: &[Wallet]| ws.iter().map(|w| w.address.clone()).collect::<Vec<_>>();
        assert_eq!(addresses(&a), addresses(&b));
    }

    #[test]
    fn test_zero_count() {
        let encoder = P2pkh::default();
        assert!(WalletGenerator::new(&encoder).generate(&account(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_count_beyond_index_space() {
        let encoder = P2pkh::default();
        assert_eq!(
            WalletGenerator::new(&encoder).generate(&account(), HARDENED_OFFSET + 1).unwrap_err(),
            DerivationError::HardenedWalletIndex(HARDENED_OFFSET)
        );
    }
}
