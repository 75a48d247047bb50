//! Alphabet registry
//!
//! Fixed character sets for each password kind. The registry is built once
//! from the policy's base64 padding flag and never mutated afterwards, so a
//! single instance can be shared freely between threads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PasswordError, Result};

const HEX_SYMBOLS: &str = "0123456789abcdef";
const BIN_SYMBOLS: &str = "01";
const BASE64_SYMBOLS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=";
const SPECIAL_SYMBOLS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]_^`{|}~";

/// Number of base64 symbols without the `=` padding character
const BASE64_UNPADDED_LEN: usize = 64;

/// Password kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphabetKind {
    Hex,
    Bin,
    Base64,
    #[serde(alias = "especial")]
    Special,
}

impl AlphabetKind {
    /// All kinds in registry order
    pub const ALL: [AlphabetKind; 4] = [
        AlphabetKind::Hex,
        AlphabetKind::Bin,
        AlphabetKind::Base64,
        AlphabetKind::Special,
    ];

    /// Canonical tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AlphabetKind::Hex => "hex",
            AlphabetKind::Bin => "bin",
            AlphabetKind::Base64 => "base64",
            AlphabetKind::Special => "special",
        }
    }

    fn index(&self) -> usize {
        match self {
            AlphabetKind::Hex => 0,
            AlphabetKind::Bin => 1,
            AlphabetKind::Base64 => 2,
            AlphabetKind::Special => 3,
        }
    }
}

impl fmt::Display for AlphabetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlphabetKind {
    type Err = PasswordError;

    /// Parse a kind tag. `especial` is accepted as an alias of `special`.
    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "hex" => Ok(AlphabetKind::Hex),
            "bin" => Ok(AlphabetKind::Bin),
            "base64" => Ok(AlphabetKind::Base64),
            "special" | "especial" => Ok(AlphabetKind::Special),
            other => Err(PasswordError::UnsupportedKind(other.to_string())),
        }
    }
}

/// An ordered set of distinct ASCII symbols for one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet {
    kind: AlphabetKind,
    symbols: &'static str,
}

impl Alphabet {
    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    /// Symbols as a string, in draw order
    pub fn as_str(&self) -> &'static str {
        self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at `index`, or `None` past the end
    pub fn symbol(&self, index: usize) -> Option<char> {
        self.symbols.as_bytes().get(index).map(|&b| b as char)
    }

    /// Check whether `ch` belongs to this alphabet
    pub fn contains(&self, ch: char) -> bool {
        self.symbols.contains(ch)
    }

    /// Check whether every character of `text` belongs to this alphabet
    pub fn covers(&self, text: &str) -> bool {
        text.chars().all(|ch| self.contains(ch))
    }
}

/// Read-only mapping from kind to alphabet
#[derive(Debug, Clone)]
pub struct AlphabetRegistry {
    alphabets: [Alphabet; 4],
}

impl AlphabetRegistry {
    /// Build the registry. `base64_padding` controls whether `=` is part of
    /// the base64 alphabet.
    pub fn new(base64_padding: bool) -> Self {
        let base64 = if base64_padding {
            BASE64_SYMBOLS
        } else {
            &BASE64_SYMBOLS[..BASE64_UNPADDED_LEN]
        };

        Self {
            alphabets: [
                Alphabet { kind: AlphabetKind::Hex, symbols: HEX_SYMBOLS },
                Alphabet { kind: AlphabetKind::Bin, symbols: BIN_SYMBOLS },
                Alphabet { kind: AlphabetKind::Base64, symbols: base64 },
                Alphabet { kind: AlphabetKind::Special, symbols: SPECIAL_SYMBOLS },
            ],
        }
    }

    /// Alphabet for a kind
    pub fn lookup(&self, kind: AlphabetKind) -> &Alphabet {
        &self.alphabets[kind.index()]
    }

    /// Alphabet for a kind tag
    ///
    /// # Errors
    /// `PasswordError::UnsupportedKind` if the tag is not registered.
    pub fn lookup_tag(&self, tag: &str) -> Result<&Alphabet> {
        let kind: AlphabetKind = tag.parse()?;
        Ok(self.lookup(kind))
    }

    /// Iterate over all registered alphabets
    pub fn iter(&self) -> impl Iterator<Item = &Alphabet> {
        self.alphabets.iter()
    }
}

impl Default for AlphabetRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}
