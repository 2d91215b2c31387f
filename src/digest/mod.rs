mod hashing;

pub use hashing::HashingReader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{fmt, sync::OnceLock};

/// Number of hex characters in a SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

fn sha256_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]{64}$").expect("sha256 pattern is valid"))
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("expected 64 hex characters, got {0}")]
    Length(usize),
    #[error("invalid hex digest '{0}'")]
    Charset(String),
}

/// A SHA-256 digest as lower-case hex.
///
/// Validated on construction, so holding one means the value is well-formed.
/// Upper-case input is accepted and normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha256Hex(String);

impl Sha256Hex {
    pub fn parse(value: &str) -> Result<Self, DigestError> {
        let trimmed = value.trim();
        if trimmed.len() != SHA256_HEX_LEN {
            return Err(DigestError::Length(trimmed.len()));
        }

        let lowered = trimmed.to_ascii_lowercase();
        if !sha256_re().is_match(&lowered) {
            return Err(DigestError::Charset(trimmed.to_string()));
        }

        Ok(Self(lowered))
    }

    /// Finalize a hasher into its hex digest.
    pub fn from_hasher(hasher: Sha256) -> Self {
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Sha256Hex {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Sha256Hex> for String {
    fn from(value: Sha256Hex) -> Self {
        value.0
    }
}

impl fmt::Display for Sha256Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
