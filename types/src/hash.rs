//! 32-byte hash types: ledger chain hashes and nullifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{hex, ParseError};

/// A 32-byte SHA-256 hash linking ledger blocks together.
///
/// Rendered as 64 lowercase hex characters. The genesis value is all zeros,
/// which renders as 64 `'0'` characters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainHash([u8; 32]);

impl ChainHash {
    /// The virtual predecessor of the first ledger block.
    pub const GENESIS: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_genesis(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl Default for ChainHash {
    fn default() -> Self {
        Self::GENESIS
    }
}

impl fmt::Debug for ChainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainHash({}\u{2026})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ChainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for ChainHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode::<32>(s).map(Self)
    }
}

/// A deterministic one-way pseudonym binding one identity to one scoped action.
///
/// Two nullifiers are equal exactly when the same secret acted on the same
/// scope, which is how repeats are detected without storing the secret.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Nullifier([u8; 32]);

impl Nullifier {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nullifier({}\u{2026})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for Nullifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode::<32>(s).map(Self)
    }
}
