//! Ephemeral token keys
//!
//! A key is 32 bytes drawn from the OS entropy source:
//! 1. bytes 0..16 sign the token (HMAC-SHA256)
//! 2. bytes 16..32 encrypt it (AES-128-CBC)
//!
//! Keys are rendered as URL-safe base64 with padding (44 characters), the
//! same form Fernet implementations use, and are zeroized on drop.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Total key length (32 bytes = 256 bits)
pub const KEY_LENGTH: usize = 32;

/// Length of the HMAC signing half
const SIGNING_KEY_LENGTH: usize = 16;

/// Symmetric key for one encrypt/decrypt round trip
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TokenKey {
    bytes: [u8; KEY_LENGTH],
}

impl TokenKey {
    /// Generate a fresh key from the OS entropy source
    ///
    /// # Errors
    /// `CryptoError::KeyGeneration` if the entropy source fails.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_LENGTH];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        Ok(Self { bytes })
    }

    /// Build a key from raw bytes (must be exactly 32)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LENGTH {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_LENGTH,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(bytes);
        Ok(Self { bytes: key })
    }

    /// Parse a URL-safe base64 key
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let mut decoded = URL_SAFE
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("invalid base64: {}", e)))?;
        let key = Self::from_bytes(&decoded);
        decoded.zeroize();
        key
    }

    /// URL-safe base64 rendering of the key
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        &self.bytes[..SIGNING_KEY_LENGTH]
    }

    pub(crate) fn encryption_key(&self) -> &[u8] {
        &self.bytes[SIGNING_KEY_LENGTH..]
    }
}

// Never print key material
impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKey").finish_non_exhaustive()
    }
}
