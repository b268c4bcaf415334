//! Session: credentials in, protected wallet records out

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use hdvanity_crypto::{EncryptionError, KeyEncryptor};
use hdvanity_pattern::Matcher;
use hdvanity_wallet::{account_from_seed, Account, AddressEncoder, P2pkh, SeedDeriver, Wallet};

use crate::config::{Credentials, RunMode, SessionConfig};
use crate::error::Result;
use crate::generator::WalletGenerator;
use crate::record::{ProtectedKey, WalletRecord};
use crate::search::VanitySearcher;
use crate::stats::Progress;

/// An account ready to derive from, with the passphrase its keys are
/// encrypted under
pub struct OpenedAccount {
    account: Account,
    passphrase: Zeroizing<String>,
}

impl OpenedAccount {
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

/// Ties configuration, derivation, search and encryption together
pub struct Session {
    config: SessionConfig,
    encoder: P2pkh,
    encryptor: KeyEncryptor,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let encoder = P2pkh::new(config.network);
        let encryptor = KeyEncryptor::new(config.encryption_log_n);
        Self { config, encoder, encryptor }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn encoder(&self) -> &dyn AddressEncoder {
        &self.encoder
    }

    /// Resolve credentials for the run mode and derive the account
    pub fn open(&self, supplied: Option<Credentials>) -> Result<OpenedAccount> {
        let mode = self.config.run_mode;
        let credentials = mode.resolve(supplied)?;
        if mode == RunMode::Trace {
            debug!(
                secret = credentials.secret.as_str(),
                salt = credentials.salt.as_str(),
                "credentials"
            );
        }

        let deriver = SeedDeriver::new(mode.policy(self.config.policy), self.config.stretch);
        let seed = deriver.derive(&credentials.secret, &credentials.salt)?;
        let account = account_from_seed(&seed, self.config.account_index)?;
        info!(
            mode = %mode,
            account = self.config.account_index,
            xpub = %account.xpub(self.config.network),
            "account opened"
        );

        let passphrase = match &self.config.passphrase {
            Some(passphrase) => Zeroizing::new(passphrase.clone()),
            None => credentials.salt.clone(),
        };
        Ok(OpenedAccount { account, passphrase })
    }

    /// Account extended public key for display
    pub fn account_xpub(&self, opened: &OpenedAccount) -> String {
        opened.account.xpub(self.config.network)
    }

    /// Wallets `0..count`, keys protected
    pub fn wallets(&self, opened: &OpenedAccount, count: u32) -> Result<Vec<WalletRecord>> {
        let wallets = WalletGenerator::new(&self.encoder).generate(&opened.account, count)?;
        wallets
            .iter()
            .map(|wallet| self.record(opened, wallet, WalletRecord::label_for(wallet.index, None)))
            .collect()
    }

    /// The `count` lowest-index vanity matches, keys protected
    pub fn vanity<M, F>(
        &self,
        opened: &OpenedAccount,
        matcher: &M,
        count: u32,
        on_progress: F,
    ) -> Result<Vec<WalletRecord>>
    where
        M: Matcher + ?Sized,
        F: FnMut(Progress),
    {
        let matches = VanitySearcher::new(&self.encoder, self.config.search.clone())
            .search(&opened.account, matcher, count, on_progress)?;
        matches
            .iter()
            .map(|m| {
                let label = WalletRecord::label_for(m.index(), Some(&m.label));
                self.record(opened, &m.wallet, label)
            })
            .collect()
    }

    /// Private key of `record` in import format
    pub fn reveal(&self, record: &WalletRecord, passphrase: &str) -> Result<Zeroizing<String>> {
        match &record.private_key {
            ProtectedKey::Plaintext(wif) => Ok(Zeroizing::new(wif.clone())),
            ProtectedKey::Encrypted(encrypted) => {
                let bytes = self.encryptor.decrypt(encrypted, passphrase)?;
                let key: [u8; 32] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| EncryptionError::Malformed(format!("{}-byte private key", bytes.len())))?;
                let key = Zeroizing::new(key);
                Ok(Zeroizing::new(self.encoder.export_private_key(&key)))
            }
        }
    }

    fn record(&self, opened: &OpenedAccount, wallet: &Wallet, label: String) -> Result<WalletRecord> {
        let private_key = self.protect(wallet, &opened.passphrase)?;
        Ok(WalletRecord {
            index: wallet.index,
            label,
            private_key,
            address: wallet.address.clone(),
        })
    }

    fn protect(&self, wallet: &Wallet, passphrase: &str) -> Result<ProtectedKey> {
        let key = Zeroizing::new(wallet.private_key_bytes());
        match self.encryptor.encrypt(&key[..], passphrase) {
            Ok(encrypted) => Ok(ProtectedKey::Encrypted(encrypted)),
            Err(err) if self.config.allow_plaintext_fallback => {
                warn!(index = wallet.index, error = %err, "encryption failed, emitting plaintext key");
                Ok(ProtectedKey::Plaintext(wallet.export_private_key(&self.encoder)))
            }
            Err(err) => Err(err.into()),
        }
    }
}
