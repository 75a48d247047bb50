//! Error types for pwforge

use thiserror::Error;

use crate::alphabet::AlphabetKind;

/// Main error type for password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Kind tag is not one of the registered alphabets
    #[error("Unsupported password kind: {0}")]
    UnsupportedKind(String),

    /// Requested length falls outside the policy bounds
    #[error("Invalid password length {length}: must be between {min} and {max}")]
    InvalidLength {
        length: usize,
        min: usize,
        max: usize,
    },

    /// Key generation, encryption or decryption failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Generated password did not pass validation for its kind
    #[error("Generated password failed validation for kind {0}")]
    ValidationFailed(AlphabetKind),

    /// Decrypted text differs from the text that was encrypted
    #[error("Round trip produced different plaintext")]
    RoundTripMismatch,

    /// Policy bounds are inconsistent
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failures of the token scheme
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The entropy source could not produce key material
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Key is not 32 bytes of URL-safe base64
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Token could not be parsed or decoded
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// HMAC tag did not verify: wrong key or tampered token
    #[error("Authentication failed: wrong key or tampered token")]
    AuthenticationFailed,

    /// Token is older than the allowed time-to-live
    #[error("Token expired")]
    Expired,
}

impl From<serde_json::Error> for PasswordError {
    fn from(err: serde_json::Error) -> Self {
        PasswordError::Config(err.to_string())
    }
}

/// Result type alias for password operations
pub type Result<T> = std::result::Result<T, PasswordError>;
