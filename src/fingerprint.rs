use std::fmt;
use std::str::FromStr;

use crate::errors::InvalidFingerprintError;

/// SHA-256 content fingerprint of an image blob.
///
/// This is the deduplication key of the cache: two downloads with equal
/// fingerprints are considered the same image. The digest is kept as a
/// lowercase 64-character hexadecimal string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a byte blob.
    ///
    /// Deterministic and pure. Empty input is valid and yields the digest
    /// of the empty string.
    pub fn of(blob: &[u8]) -> Self {
        Self(sha256::digest(blob))
    }

    /// Hex digest as stored in the database.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Fingerprint {
    type Err = InvalidFingerprintError;

    /// Parse a hex digest, normalizing case.
    ///
    /// Digest values coming from the database or from user input are
    /// opaque: anything that is not 64 hex characters is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidFingerprintError);
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
