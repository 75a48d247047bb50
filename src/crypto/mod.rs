//! Cryptographic operations for pwforge
//!
//! Secure password drawing plus a Fernet-compatible authenticated token
//! scheme (AES-128-CBC with PKCS7 padding, HMAC-SHA256 over the whole token).

mod key;
mod token;
pub mod password;

pub use key::{TokenKey, KEY_LENGTH};
pub use token::{encrypt, decrypt, decrypt_with_ttl, token_timestamp};
pub use password::draw_password;
