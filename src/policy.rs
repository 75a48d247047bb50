//! Password policy configuration
//!
//! Length bounds, base64 composition and validation strictness are kept as
//! named configuration instead of literals, since the two known variants of
//! this generator disagree on them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PasswordError, Result};

/// Policy applied by the password engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Minimum accepted length (inclusive)
    pub min_length: usize,
    /// Maximum accepted length (inclusive)
    pub max_length: usize,
    /// Include `=` in the base64 alphabet
    pub base64_padding: bool,
    /// Validation also enforces `min_length`
    pub strict_validation: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: crate::DEFAULT_MIN_LENGTH,
            max_length: crate::DEFAULT_MAX_LENGTH,
            base64_padding: true,
            strict_validation: true,
        }
    }
}

impl PasswordPolicy {
    /// The 8..=16 variant, base64 without padding
    pub fn compact() -> Self {
        Self {
            min_length: crate::COMPACT_MIN_LENGTH,
            max_length: crate::COMPACT_MAX_LENGTH,
            base64_padding: false,
            strict_validation: true,
        }
    }

    /// Check that the bounds are usable
    pub fn validate(&self) -> Result<()> {
        if self.min_length == 0 {
            return Err(PasswordError::InvalidPolicy(
                "min_length must be at least 1".to_string(),
            ));
        }
        if self.min_length > self.max_length {
            return Err(PasswordError::InvalidPolicy(format!(
                "min_length {} exceeds max_length {}",
                self.min_length, self.max_length
            )));
        }
        Ok(())
    }

    /// Check a requested length against the bounds
    pub fn check_length(&self, length: usize) -> Result<()> {
        if length < self.min_length || length > self.max_length {
            return Err(PasswordError::InvalidLength {
                length,
                min: self.min_length,
                max: self.max_length,
            });
        }
        Ok(())
    }
}

/// Load a policy from a JSON file. Missing fields take default values.
pub fn load_policy(path: impl AsRef<Path>) -> Result<PasswordPolicy> {
    let raw = fs::read_to_string(path)?;
    let policy: PasswordPolicy = serde_json::from_str(&raw)?;
    policy.validate()?;
    Ok(policy)
}
