//! HDVanity Crypto Primitives
//!
//! Hashes, Base58Check, secp256k1 key math, key stretching and
//! passphrase-based private key encryption.

pub mod secp256k1;
pub mod hash;
pub mod encoding;
pub mod stretch;
pub mod cipher;

pub use self::secp256k1::{Secp256k1Keypair, Secp256k1Error};
pub use self::stretch::{StretchParams, StretchError};
pub use self::cipher::{KeyEncryptor, EncryptedKey, EncryptionError};

// Re-export dependencies for use by other crates
pub use hex;
pub use zeroize;
