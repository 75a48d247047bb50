//! Authenticated one-shot tokens
//!
//! Wire format (Fernet-compatible), URL-safe base64 encoded:
//!
//! ```text
//! 0x80 | timestamp (u64 BE) | IV (16) | AES-128-CBC ciphertext | HMAC-SHA256 (32)
//! ```
//!
//! The HMAC covers everything before it and is verified in constant time
//! before any decryption is attempted.

use aes::Aes128;
use base64::{Engine, engine::general_purpose::URL_SAFE};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use cbc::{Decryptor, Encryptor};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

use super::key::TokenKey;
use crate::error::CryptoError;

/// Token format version byte
const VERSION: u8 = 0x80;

/// Timestamp size (big-endian seconds since epoch)
const TIMESTAMP_SIZE: usize = 8;

/// IV size for AES-CBC (16 bytes = 128 bits)
pub(crate) const IV_SIZE: usize = 16;

const BLOCK_SIZE: usize = 16;

/// HMAC-SHA256 tag size
const HMAC_SIZE: usize = 32;

/// Version + timestamp + IV
const HEADER_SIZE: usize = 1 + TIMESTAMP_SIZE + IV_SIZE;

/// Tokens stamped further than this into the future are rejected under a TTL
const MAX_CLOCK_SKEW_SECS: u64 = 60;

type Aes128CbcEnc = Encryptor<Aes128>;
type Aes128CbcDec = Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Encrypt `plaintext` into a token stamped with the current time
///
/// # Errors
/// `CryptoError::Encryption` if the IV cannot be drawn or the cipher fails.
pub fn encrypt(plaintext: &str, key: &TokenKey) -> Result<String, CryptoError> {
    let mut iv = [0u8; IV_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CryptoError::Encryption(format!("IV generation failed: {}", e)))?;

    encrypt_from_parts(plaintext.as_bytes(), key, now_secs(), &iv)
}

/// Build a token from explicit timestamp and IV
pub(crate) fn encrypt_from_parts(
    plaintext: &[u8],
    key: &TokenKey,
    timestamp: u64,
    iv: &[u8; IV_SIZE],
) -> Result<String, CryptoError> {
    // PKCS7 always adds at least one byte
    let padded_len = ((plaintext.len() / BLOCK_SIZE) + 1) * BLOCK_SIZE;
    let mut buffer = vec![0u8; padded_len];
    buffer[..plaintext.len()].copy_from_slice(plaintext);

    let encryptor = Aes128CbcEnc::new_from_slices(key.encryption_key(), iv)
        .map_err(|e| CryptoError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let ciphertext = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, plaintext.len())
        .map_err(|e| CryptoError::Encryption(format!("Padding failed: {:?}", e)))?;

    let mut token = Vec::with_capacity(HEADER_SIZE + ciphertext.len() + HMAC_SIZE);
    token.push(VERSION);
    token.extend_from_slice(&timestamp.to_be_bytes());
    token.extend_from_slice(iv);
    token.extend_from_slice(ciphertext);

    let mut mac = HmacSha256::new_from_slice(key.signing_key())
        .map_err(|e| CryptoError::Encryption(format!("Failed to create HMAC: {}", e)))?;
    mac.update(&token);
    token.extend_from_slice(&mac.finalize().into_bytes());

    Ok(URL_SAFE.encode(token))
}

/// Decrypt a token produced by [`encrypt`] with the same key
///
/// # Errors
/// * `CryptoError::MalformedToken` - bad encoding, version or layout
/// * `CryptoError::AuthenticationFailed` - wrong key or tampered token
pub fn decrypt(token: &str, key: &TokenKey) -> Result<String, CryptoError> {
    let parsed = RawToken::parse(token)?;
    parsed.verify(key)?;
    parsed.decrypt(key)
}

/// Like [`decrypt`], but also rejects tokens older than `ttl_secs`
///
/// # Errors
/// Additionally `CryptoError::Expired` when the token is too old, and
/// `CryptoError::MalformedToken` when it is stamped too far in the future.
pub fn decrypt_with_ttl(token: &str, key: &TokenKey, ttl_secs: u64) -> Result<String, CryptoError> {
    let parsed = RawToken::parse(token)?;
    parsed.verify(key)?;

    let issued = parsed.timestamp();
    let now = now_secs();
    if issued.saturating_add(ttl_secs) < now {
        return Err(CryptoError::Expired);
    }
    if now.saturating_add(MAX_CLOCK_SKEW_SECS) < issued {
        return Err(CryptoError::MalformedToken(
            "token timestamp is in the future".to_string(),
        ));
    }

    parsed.decrypt(key)
}

/// Issue time embedded in a token. The signature is not checked.
pub fn token_timestamp(token: &str) -> Result<DateTime<Utc>, CryptoError> {
    let parsed = RawToken::parse(token)?;
    let secs = i64::try_from(parsed.timestamp())
        .map_err(|_| CryptoError::MalformedToken("timestamp out of range".to_string()))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| CryptoError::MalformedToken("timestamp out of range".to_string()))
}

fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// Decoded token bytes with a checked layout
struct RawToken {
    bytes: Vec<u8>,
}

impl RawToken {
    fn parse(token: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE
            .decode(token.trim())
            .map_err(|e| CryptoError::MalformedToken(format!("invalid base64: {}", e)))?;

        if bytes.len() < HEADER_SIZE + BLOCK_SIZE + HMAC_SIZE {
            return Err(CryptoError::MalformedToken(format!(
                "token too short: {} bytes",
                bytes.len()
            )));
        }

        if bytes[0] != VERSION {
            return Err(CryptoError::MalformedToken(format!(
                "unsupported version byte 0x{:02x}",
                bytes[0]
            )));
        }

        let ciphertext_len = bytes.len() - HEADER_SIZE - HMAC_SIZE;
        if ciphertext_len % BLOCK_SIZE != 0 {
            return Err(CryptoError::MalformedToken(format!(
                "ciphertext length {} is not a multiple of {}",
                ciphertext_len, BLOCK_SIZE
            )));
        }

        Ok(Self { bytes })
    }

    fn timestamp(&self) -> u64 {
        let mut raw = [0u8; TIMESTAMP_SIZE];
        raw.copy_from_slice(&self.bytes[1..1 + TIMESTAMP_SIZE]);
        u64::from_be_bytes(raw)
    }

    fn verify(&self, key: &TokenKey) -> Result<(), CryptoError> {
        let (signed, tag) = self.bytes.split_at(self.bytes.len() - HMAC_SIZE);
        let mut mac = HmacSha256::new_from_slice(key.signing_key())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        mac.update(signed);
        mac.verify_slice(tag)
            .map_err(|_| CryptoError::AuthenticationFailed)
    }

    fn decrypt(&self, key: &TokenKey) -> Result<String, CryptoError> {
        let iv = &self.bytes[1 + TIMESTAMP_SIZE..HEADER_SIZE];
        let ciphertext = &self.bytes[HEADER_SIZE..self.bytes.len() - HMAC_SIZE];

        // Create a mutable copy for in-place decryption
        let mut buffer = ciphertext.to_vec();

        let decryptor = Aes128CbcDec::new_from_slices(key.encryption_key(), iv)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        let plaintext = decryptor
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .map_err(|_| CryptoError::MalformedToken("invalid padding".to_string()))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| CryptoError::MalformedToken(format!("plaintext is not UTF-8: {}", e)))
    }
}
