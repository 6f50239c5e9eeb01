//! Fundamental types for VeraNode.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, locality tags, verdicts, chain hashes, nullifiers, secrets and timestamps.

pub mod area;
pub mod error;
pub mod hash;
pub mod id;
pub mod keys;
pub mod state;
pub mod time;

pub use area::Area;
pub use error::ParseError;
pub use hash::{ChainHash, Nullifier};
pub use id::{ProfileId, RumorId};
pub use keys::Secret;
pub use state::{RumorState, Verdict};
pub use time::Timestamp;

// Inline hex encoding to avoid adding the `hex` crate as a dependency of types.
pub(crate) mod hex {
    use crate::ParseError;

    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn decode<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
        if s.len() != N * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseError::InvalidHex {
                expected: N * 2,
                got: s.len(),
            });
        }
        let mut out = [0u8; N];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| {
                ParseError::InvalidHex {
                    expected: N * 2,
                    got: s.len(),
                }
            })?;
        }
        Ok(out)
    }
}
