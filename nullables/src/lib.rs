//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! External dependencies (clock, storage, moderation oracle) sit behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including injected failures
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod oracle;
pub mod store;

pub use clock::NullClock;
pub use oracle::{NullOracle, OracleBehavior};
pub use store::{NullBatch, NullStore};
