//! Password engine
//!
//! Stateless apart from its immutable policy and alphabet registry, so one
//! engine can serve any number of callers and threads.

use std::fmt;

use rand::CryptoRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::alphabet::{AlphabetKind, AlphabetRegistry};
use crate::crypto::{self, TokenKey, draw_password};
use crate::error::Result;
use crate::policy::PasswordPolicy;

/// A freshly drawn password. The plaintext is wiped on drop.
#[derive(Clone)]
pub struct GeneratedPassword {
    plaintext: String,
    kind: AlphabetKind,
}

impl GeneratedPassword {
    pub fn as_str(&self) -> &str {
        &self.plaintext
    }

    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.plaintext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plaintext.is_empty()
    }

    /// Take the plaintext out of the wrapper. The returned string is no
    /// longer wiped on drop.
    pub fn into_string(mut self) -> String {
        std::mem::take(&mut self.plaintext)
    }
}

impl Drop for GeneratedPassword {
    fn drop(&mut self) {
        self.plaintext.zeroize();
    }
}

impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedPassword")
            .field("kind", &self.kind)
            .field("len", &self.plaintext.len())
            .finish()
    }
}

/// Token produced by [`PasswordEngine::encrypt_round_trip`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedPassword(String);

impl EncryptedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EncryptedPassword {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for EncryptedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates, round-trips and validates passwords under one policy
#[derive(Debug, Clone)]
pub struct PasswordEngine {
    policy: PasswordPolicy,
    registry: AlphabetRegistry,
}

impl PasswordEngine {
    /// Create an engine for `policy`
    ///
    /// # Errors
    /// `PasswordError::InvalidPolicy` if the bounds are inconsistent.
    pub fn new(policy: PasswordPolicy) -> Result<Self> {
        policy.validate()?;
        let registry = AlphabetRegistry::new(policy.base64_padding);
        Ok(Self { policy, registry })
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &AlphabetRegistry {
        &self.registry
    }

    /// Generate a password of `length` characters from the alphabet of `kind`
    ///
    /// Draws from the thread-local CSPRNG.
    ///
    /// # Errors
    /// `PasswordError::InvalidLength` if `length` is outside the policy bounds.
    pub fn generate(&self, length: usize, kind: AlphabetKind) -> Result<GeneratedPassword> {
        self.generate_with(&mut rand::rng(), length, kind)
    }

    /// Like [`generate`](Self::generate), with the kind given as a tag
    ///
    /// # Errors
    /// `PasswordError::UnsupportedKind` for an unknown tag, then the same
    /// errors as `generate`.
    pub fn generate_tag(&self, length: usize, tag: &str) -> Result<GeneratedPassword> {
        let kind: AlphabetKind = tag.parse()?;
        self.generate(length, kind)
    }

    /// Generate using a caller-supplied cryptographic generator
    pub fn generate_with<R: CryptoRng>(
        &self,
        rng: &mut R,
        length: usize,
        kind: AlphabetKind,
    ) -> Result<GeneratedPassword> {
        self.policy.check_length(length)?;
        let alphabet = self.registry.lookup(kind);

        Ok(GeneratedPassword {
            plaintext: draw_password(rng, alphabet, length),
            kind,
        })
    }

    /// Encrypt `password` under a freshly generated key
    ///
    /// The key is not kept anywhere; it is handed to the caller with the token.
    ///
    /// # Errors
    /// `PasswordError::Crypto` if key generation or encryption fails.
    pub fn encrypt_round_trip(&self, password: &str) -> Result<(EncryptedPassword, TokenKey)> {
        let key = TokenKey::generate()?;
        let token = crypto::encrypt(password, &key)?;
        Ok((EncryptedPassword(token), key))
    }

    /// Invert [`encrypt_round_trip`](Self::encrypt_round_trip)
    ///
    /// # Errors
    /// `PasswordError::Crypto` with `AuthenticationFailed` for a wrong key or
    /// tampered token, `MalformedToken` for anything that does not parse.
    pub fn decrypt(&self, encrypted: &EncryptedPassword, key: &TokenKey) -> Result<String> {
        Ok(crypto::decrypt(encrypted.as_str(), key)?)
    }

    /// Check that every character of `password` belongs to the alphabet of
    /// `kind`. With strict validation the policy minimum length applies too.
    pub fn validate(&self, password: &str, kind: AlphabetKind) -> bool {
        if password.is_empty() {
            return false;
        }
        if self.policy.strict_validation && password.chars().count() < self.policy.min_length {
            return false;
        }
        self.registry.lookup(kind).covers(password)
    }

    /// Like [`validate`](Self::validate); unknown tags yield `false`
    pub fn validate_tag(&self, password: &str, tag: &str) -> bool {
        match tag.parse::<AlphabetKind>() {
            Ok(kind) => self.validate(password, kind),
            Err(_) => false,
        }
    }
}

impl Default for PasswordEngine {
    fn default() -> Self {
        let policy = PasswordPolicy::default();
        let registry = AlphabetRegistry::new(policy.base64_padding);
        Self { policy, registry }
    }
}
