//! # pwforge
//!
//! Random password generation over fixed alphabets, with an authenticated
//! encrypt/decrypt round trip and alphabet validation.
//!
//! ## Features
//!
//! - Four alphabets: `hex`, `bin`, `base64`, `special`
//! - Uniform draws from a cryptographically secure generator
//! - Fernet-compatible tokens (AES-128-CBC + HMAC-SHA256) under a fresh key
//! - Configurable length bounds and base64 padding
//! - JSON-lines failure log for front ends
//!
//! ## Example
//!
//! ```
//! use pwforge::{AlphabetKind, PasswordEngine};
//!
//! let engine = PasswordEngine::default();
//! let password = engine.generate(16, AlphabetKind::Hex).unwrap();
//! assert!(engine.validate(password.as_str(), AlphabetKind::Hex));
//!
//! let (encrypted, key) = engine.encrypt_round_trip(password.as_str()).unwrap();
//! let decrypted = engine.decrypt(&encrypted, &key).unwrap();
//! assert_eq!(decrypted, password.as_str());
//! ```

pub mod alphabet;
pub mod crypto;
pub mod engine;
pub mod policy;
pub mod session;
pub mod error;

// Re-export main types
pub use error::{PasswordError, CryptoError, Result};
pub use alphabet::{Alphabet, AlphabetKind, AlphabetRegistry};
pub use engine::{PasswordEngine, GeneratedPassword, EncryptedPassword};
pub use crypto::TokenKey;
pub use policy::{PasswordPolicy, load_policy};
pub use session::{
    run_request, FailureEntry, FailureLog, NoProgress, PasswordReport, PasswordRequest,
    ProgressSink, ProgressStage,
};

/// Default minimum password length
pub const DEFAULT_MIN_LENGTH: usize = 16;

/// Default maximum password length
pub const DEFAULT_MAX_LENGTH: usize = 1024;

/// Minimum length of the compact policy
pub const COMPACT_MIN_LENGTH: usize = 8;

/// Maximum length of the compact policy
pub const COMPACT_MAX_LENGTH: usize = 16;

/// Length used when a front end supplies none
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;
