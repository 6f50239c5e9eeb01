//! Abstract storage traits for VeraNode.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! Reads that do not need to be consistent with a write go through the
//! per-table read stores. Everything that mutates state goes through a
//! [`WriteBatch`]: one all-or-nothing transaction whose reads see its own
//! uncommitted writes, and which is rolled back if dropped without
//! [`WriteBatch::commit`].

pub mod batch;
pub mod error;
pub mod ledger;
pub mod meta;
pub mod profile;
pub mod rumor;
pub mod vote;

pub use batch::{LifecycleStore, WriteBatch};
pub use error::StoreError;
pub use ledger::{BlockSnapshot, LedgerBlock, LedgerStore};
pub use meta::MetaStore;
pub use profile::{Profile, ProfileStore};
pub use rumor::{Rumor, RumorStore};
pub use vote::{Vote, VoteStore, VoteTally};
