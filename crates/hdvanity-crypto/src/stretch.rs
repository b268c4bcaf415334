//! Password stretching: scrypt and PBKDF2-HMAC-SHA256.
//!
//! The brain-wallet seed is the XOR of two independent stretches of the
//! same credentials, each domain-separated by a trailing tag byte.

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StretchError {
    #[error("Invalid scrypt parameters: {0}")]
    InvalidScryptParams(String),
    #[error("PBKDF2 rounds must be non-zero")]
    ZeroRounds,
}

/// Cost parameters for the dual stretch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StretchParams {
    /// scrypt cost, N = 2^log_n
    pub log_n: u8,
    /// scrypt block size
    pub r: u32,
    /// scrypt parallelism
    pub p: u32,
    /// PBKDF2-HMAC-SHA256 iteration count
    pub pbkdf2_rounds: u32,
}

impl StretchParams {
    /// Production cost (scrypt N=2^18, r=8, p=1; PBKDF2 65536 rounds)
    pub const fn standard() -> Self {
        Self { log_n: 18, r: 8, p: 1, pbkdf2_rounds: 65536 }
    }

    /// Cheap parameters for tests and debug runs. Never use for real funds.
    pub const fn fast() -> Self {
        Self { log_n: 10, r: 8, p: 1, pbkdf2_rounds: 1024 }
    }
}

impl Default for StretchParams {
    fn default() -> Self {
        Self::standard()
    }
}

/// scrypt with an output length of `N` bytes
pub fn scrypt_bytes<const N: usize>(
    password: &[u8],
    salt: &[u8],
    log_n: u8,
    r: u32,
    p: u32,
) -> Result<Zeroizing<[u8; N]>, StretchError> {
    let params = scrypt::Params::new(log_n, r, p, N)
        .map_err(|e| StretchError::InvalidScryptParams(e.to_string()))?;
    let mut out = Zeroizing::new([0u8; N]);
    scrypt::scrypt(password, salt, &params, out.as_mut())
        .map_err(|e| StretchError::InvalidScryptParams(e.to_string()))?;
    Ok(out)
}

/// PBKDF2-HMAC-SHA256 producing 32 bytes
pub fn pbkdf2_sha256(password: &[u8], salt: &[u8], rounds: u32) -> Result<Zeroizing<[u8; 32]>, StretchError> {
    if rounds == 0 {
        return Err(StretchError::ZeroRounds);
    }
    let mut out = Zeroizing::new([0u8; 32]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, out.as_mut());
    Ok(out)
}

fn tagged(data: &[u8], tag: u8) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(Vec::with_capacity(data.len() + 1));
    buf.extend_from_slice(data);
    buf.push(tag);
    buf
}

/// `scrypt(secret‖1, salt‖1) XOR pbkdf2(secret‖2, salt‖2)`
pub fn dual_stretch(
    secret: &[u8],
    salt: &[u8],
    params: &StretchParams,
) -> Result<Zeroizing<[u8; 32]>, StretchError> {
    let mut out = scrypt_bytes::<32>(
        &tagged(secret, 0x01),
        &tagged(salt, 0x01),
        params.log_n,
        params.r,
        params.p,
    )?;
    let second = pbkdf2_sha256(&tagged(secret, 0x02), &tagged(salt, 0x02), params.pbkdf2_rounds)?;

    for (a, b) in out.iter_mut().zip(second.iter()) {
        *a ^= b;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf2_rfc6070_style_vector() {
        // PBKDF2-HMAC-SHA256("password", "salt", 1)
        let out = pbkdf2_sha256(b"password", b"salt", 1).unwrap();
        assert_eq!(
            hex::encode(*out),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn test_scrypt_rfc7914_vector() {
        let out = scrypt_bytes::<64>(b"password", b"NaCl", 10, 8, 16).unwrap();
        assert_eq!(
            hex::encode(*out),
            "fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b373162\
             2eaf30d92e22a3886ff109279d9830dac727afb94a83ee6d8360cbdfa2cc0640"
        );
    }

    #[test]
    fn test_dual_stretch_fast_vector() {
        let seed = dual_stretch(b"https://github.com/aiportal", b"gowallet", &StretchParams::fast()).unwrap();
        assert_eq!(
            hex::encode(*seed),
            "02c96cb942f57a1689e343b04e44432e9e387a69d3cf8db08a043e52a1028f7b"
        );
    }

    #[test]
    fn test_invalid_params() {
        let params = StretchParams { r: 0, ..StretchParams::fast() };
        assert!(matches!(
            dual_stretch(b"secret", b"salt", &params),
            Err(StretchError::InvalidScryptParams(_))
        ));

        let params = StretchParams { pbkdf2_rounds: 0, ..StretchParams::fast() };
        assert_eq!(dual_stretch(b"secret", b"salt", &params), Err(StretchError::ZeroRounds));
    }
}
