//! HDVanity Core Engine
//!
//! Sessions, wallet generation, multi-threaded vanity search and export.

mod config;
mod error;
mod export;
mod generator;
mod record;
mod search;
mod session;
mod stats;

pub use config::{Credentials, RunMode, SessionConfig, DEBUG_SALT, DEBUG_SECRET};
pub use error::{Error, Result};
pub use export::{export_to_path, read_path, read_records, write_records, ExportError};
pub use generator::WalletGenerator;
pub use record::{ProtectedKey, WalletRecord};
pub use search::{SearchConfig, VanityMatch, VanitySearcher};
pub use session::{OpenedAccount, Session};
pub use stats::{Progress, SearchStats};

// Re-exports for convenience
pub use hdvanity_crypto::{EncryptedKey, EncryptionError, KeyEncryptor, StretchParams};
pub use hdvanity_pattern::{calculate_difficulty, combined_difficulty, format_difficulty, Matcher, Pattern, PatternMatcher, PatternType};
pub use hdvanity_wallet::{Account, AddressEncoder, CredentialPolicy, Network, P2pkh, Wallet};
