//! Base58Check and WIF encoding

use thiserror::Error;

use crate::hash::double_sha256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Invalid checksum")]
    InvalidChecksum,
    #[error("Invalid character in input")]
    InvalidCharacter,
    #[error("Invalid length")]
    InvalidLength,
    #[error("Unexpected version byte {0:#04x}")]
    UnexpectedVersion(u8),
}

/// Base58 alphabet used by Bitcoin addresses and keys
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Base58Check encode arbitrary bytes (4-byte double-SHA256 checksum appended)
pub fn base58check_encode_raw(data: &[u8]) -> String {
    let mut buf = Vec::with_capacity(data.len() + 4);
    buf.extend_from_slice(data);
    let checksum = double_sha256(data);
    buf.extend_from_slice(&checksum[..4]);
    bs58::encode(buf).into_string()
}

/// Base58Check decode, returns the checked bytes without the checksum
pub fn base58check_decode_raw(input: &str) -> Result<Vec<u8>, EncodingError> {
    let mut data = bs58::decode(input)
        .into_vec()
        .map_err(|_| EncodingError::InvalidCharacter)?;

    if data.len() < 5 {
        return Err(EncodingError::InvalidLength);
    }

    let split = data.len() - 4;
    let computed_checksum = double_sha256(&data[..split]);
    if data[split..] != computed_checksum[..4] {
        return Err(EncodingError::InvalidChecksum);
    }

    data.truncate(split);
    Ok(data)
}

/// Base58Check encode with a single version byte
pub fn base58check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len());
    data.push(version);
    data.extend_from_slice(payload);
    base58check_encode_raw(&data)
}

/// Base58Check decode, returns (version, payload)
pub fn base58check_decode(input: &str) -> Result<(u8, Vec<u8>), EncodingError> {
    let data = base58check_decode_raw(input)?;
    let version = data[0];
    Ok((version, data[1..].to_vec()))
}

/// Encode WIF (Wallet Import Format) for private key
pub fn wif_encode(private_key: &[u8; 32], compressed: bool, mainnet: bool) -> String {
    let version = if mainnet { 0x80 } else { 0xEF };

    if compressed {
        let mut payload = Vec::with_capacity(33);
        payload.extend_from_slice(private_key);
        payload.push(0x01);
        base58check_encode(version, &payload)
    } else {
        base58check_encode(version, private_key)
    }
}

/// Decode a WIF string into (private key, compressed, mainnet)
pub fn wif_decode(input: &str) -> Result<([u8; 32], bool, bool), EncodingError> {
    let (version, payload) = base58check_decode(input)?;
    let mainnet = match version {
        0x80 => true,
        0xEF => false,
        other => return Err(EncodingError::UnexpectedVersion(other)),
    };
    let compressed = match payload.len() {
        32 => false,
        33 if payload[32] == 0x01 => true,
        _ => return Err(EncodingError::InvalidLength),
    };
    let mut key = [0u8; 32];
    key.copy_from_slice(&payload[..32]);
    Ok((key, compressed, mainnet))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58check_roundtrip() {
        let payload = [1u8; 20];
        let encoded = base58check_encode(0x00, &payload);
        let (version, decoded) = base58check_decode(&encoded).unwrap();
        assert_eq!(version, 0x00);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_corrupted_checksum_is_rejected() {
        let mut encoded = base58check_encode(0x00, &[7u8; 20]).into_bytes();
        let last = encoded.len() - 1;
        encoded[last] = if encoded[last] == b'2' { b'3' } else { b'2' };
        let encoded = String::from_utf8(encoded).unwrap();
        assert_eq!(base58check_decode(&encoded), Err(EncodingError::InvalidChecksum));
    }

    #[test]
    fn test_wif_encode() {
        let privkey = hex::decode("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
        let mut pk = [0u8; 32];
        pk.copy_from_slice(&privkey);

        let wif = wif_encode(&pk, true, true);
        assert_eq!(wif, "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn");

        let (decoded, compressed, mainnet) = wif_decode(&wif).unwrap();
        assert_eq!(decoded, pk);
        assert!(compressed);
        assert!(mainnet);
    }

    #[test]
    fn test_wif_decode_rejects_address() {
        let address = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
        assert_eq!(wif_decode(address), Err(EncodingError::UnexpectedVersion(0x00)));
    }
}
