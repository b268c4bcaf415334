//! secp256k1 key operations for hierarchical derivation

use k256::{
    elliptic_curve::sec1::ToEncodedPoint,
    NonZeroScalar, PublicKey, SecretKey,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Secp256k1Error {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key encoding ({0} bytes)")]
    InvalidPublicKey(usize),
    #[error("Tweak is not a valid scalar or produces the zero key")]
    InvalidTweak,
}

/// A secp256k1 keypair. The public key is computed once at construction.
#[derive(Clone)]
pub struct Secp256k1Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Secp256k1Keypair {
    /// Create from raw 32-byte private key
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, Secp256k1Error> {
        let secret_key = SecretKey::from_bytes(bytes.into())
            .map_err(|_| Secp256k1Error::InvalidPrivateKey)?;
        let public_key = secret_key.public_key();
        Ok(Self { secret_key, public_key })
    }

    /// Get the private key as bytes
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.secret_key.to_bytes().into()
    }

    /// Get the uncompressed public key (65 bytes: 0x04 || x || y)
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        let point = self.public_key.to_encoded_point(false);
        let mut result = [0u8; 65];
        result.copy_from_slice(point.as_bytes());
        result
    }

    /// Get the compressed public key (33 bytes: 0x02/0x03 || x)
    pub fn public_key_compressed(&self) -> [u8; 33] {
        let point = self.public_key.to_encoded_point(true);
        let mut result = [0u8; 33];
        result.copy_from_slice(point.as_bytes());
        result
    }

    /// Return the keypair for `(tweak + k) mod n`.
    ///
    /// Fails when the tweak is zero or not below the curve order, or when the
    /// sum is zero. BIP32 treats both as an underivable child index.
    pub fn tweak_add(&self, tweak: &[u8; 32]) -> Result<Self, Secp256k1Error> {
        let tweak = NonZeroScalar::try_from(&tweak[..]).map_err(|_| Secp256k1Error::InvalidTweak)?;
        let parent = self.secret_key.to_nonzero_scalar();
        let sum = *tweak + *parent;
        let child = Option::<NonZeroScalar>::from(NonZeroScalar::new(sum))
            .ok_or(Secp256k1Error::InvalidTweak)?;

        let secret_key = SecretKey::from(child);
        let public_key = secret_key.public_key();
        Ok(Self { secret_key, public_key })
    }
}

impl std::fmt::Debug for Secp256k1Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1Keypair")
            .field("public_key", &hex::encode(self.public_key_compressed()))
            .finish_non_exhaustive()
    }
}

/// Parse a SEC1 public key (33-byte compressed or 65-byte uncompressed) and
/// return its compressed form.
pub fn compress_public_key(bytes: &[u8]) -> Result<[u8; 33], Secp256k1Error> {
    if bytes.len() != 33 && bytes.len() != 65 {
        return Err(Secp256k1Error::InvalidPublicKey(bytes.len()));
    }
    let public_key = PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| Secp256k1Error::InvalidPublicKey(bytes.len()))?;
    let point = public_key.to_encoded_point(true);
    let mut result = [0u8; 33];
    result.copy_from_slice(point.as_bytes());
    Ok(result)
}
