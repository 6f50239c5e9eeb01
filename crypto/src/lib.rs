//! Cryptographic primitives for VeraNode.
//!
//! - **SHA-256** for ledger block hashes and nullifiers
//! - **Nullifiers**: deterministic one-way pseudonyms scoped to a rumor
//! - OS-backed randomness for account secrets and record identifiers

pub mod error;
pub mod hash;
pub mod nullifier;
pub mod random;

pub use error::CryptoError;
pub use hash::{sha256, sha256_hex, sha256_multi};
pub use nullifier::{nullifier, rumor_nullifier, vote_nullifier};
pub use random::{generate_profile_id, generate_rumor_id, generate_secret};
