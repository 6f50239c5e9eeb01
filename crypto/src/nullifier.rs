//! Nullifier generation.
//!
//! `nullifier(secret, scope) = SHA-256(secret || scope)`. The same identity
//! produces a different nullifier for every rumor, but the same one when it
//! acts twice on the same rumor; that collision is the double-action detector.
//!
//! Authorship and vote nullifiers are both scoped by the rumor id. They are
//! kept in separate uniqueness indexes and are never compared with each other.

use veranode_types::{Nullifier, RumorId, Secret};

use crate::hash::sha256_multi;

/// Derive the nullifier of `secret` acting on `scope_id`.
pub fn nullifier(secret: &Secret, scope_id: &str) -> Nullifier {
    Nullifier::new(sha256_multi(&[
        secret.expose().as_bytes(),
        scope_id.as_bytes(),
    ]))
}

/// Nullifier recorded against a vote on `rumor`.
pub fn vote_nullifier(secret: &Secret, rumor: &RumorId) -> Nullifier {
    nullifier(secret, &rumor.to_string())
}

/// Nullifier recorded against the author of a freshly posted `rumor`.
pub fn rumor_nullifier(secret: &Secret, rumor: &RumorId) -> Nullifier {
    nullifier(secret, &rumor.to_string())
}
