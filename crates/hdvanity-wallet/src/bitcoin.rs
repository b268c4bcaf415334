//! Bitcoin P2PKH address encoder

use crate::traits::{AddressEncoder, AddressError, Network};
use hdvanity_crypto::{
    encoding::{base58check_encode, wif_encode, BASE58_ALPHABET},
    hash::hash160,
    secp256k1::compress_public_key,
};

/// Legacy pay-to-public-key-hash addresses over compressed keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct P2pkh {
    network: Network,
}

impl P2pkh {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

impl AddressEncoder for P2pkh {
    fn name(&self) -> &'static str {
        "P2PKH (Legacy)"
    }

    fn encode(&self, public_key: &[u8]) -> Result<String, AddressError> {
        // Uncompressed input is normalised so one key always maps to one address
        let compressed = compress_public_key(public_key)
            .map_err(|e| AddressError::InvalidPublicKey(e.to_string()))?;
        Ok(base58check_encode(self.network.p2pkh_version(), &hash160(&compressed)))
    }

    fn valid_address_chars(&self) -> &'static str {
        BASE58_ALPHABET
    }

    fn address_prefix(&self) -> &'static str {
        match self.network {
            Network::Mainnet => "1",
            // Testnet P2PKH starts with either 'm' or 'n'
            Network::Testnet => "",
        }
    }

    fn export_private_key(&self, private_key: &[u8; 32]) -> String {
        wif_encode(private_key, true, self.network.is_mainnet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdvanity_crypto::Secp256k1Keypair;

    fn key_one() -> Secp256k1Keypair {
        let mut k = [0u8; 32];
        k[31] = 1;
        Secp256k1Keypair::from_bytes(&k).unwrap()
    }

    #[test]
    fn test_known_vector() {
        let kp = key_one();
        let encoder = P2pkh::default();
        assert_eq!(
            encoder.encode(&kp.public_key_compressed()).unwrap(),
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
        );
        assert_eq!(
            encoder.export_private_key(&kp.private_key_bytes()),
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
        );
    }

    #[test]
    fn test_uncompressed_input_normalised() {
        let kp = key_one();
        let encoder = P2pkh::default();
        assert_eq!(
            encoder.encode(&kp.public_key_uncompressed()).unwrap(),
            encoder.encode(&kp.public_key_compressed()).unwrap()
        );
    }

    #[test]
    fn test_testnet_version() {
        let kp = key_one();
        let address = P2pkh::new(Network::Testnet).encode(&kp.public_key_compressed()).unwrap();
        assert!(address.starts_with('m') || address.starts_with('n'));
    }

    #[test]
    fn test_invalid_public_key() {
        let encoder = P2pkh::default();
        assert!(matches!(encoder.encode(&[]), Err(AddressError::InvalidPublicKey(_))));
        assert!(matches!(encoder.encode(&[0x04; 65]), Err(AddressError::InvalidPublicKey(_))));
    }
}
