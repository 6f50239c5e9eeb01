//! Append-only, hash-chained ledger of finalized rumor verdicts.
//!
//! Each block commits to its rumor's content, final decision and frozen
//! vote aggregates, and to the hash of the block before it. The first
//! block links to the all-zero genesis hash. Blocks are never edited or
//! removed; the only write path is [`append`], which runs inside the
//! caller's [`WriteBatch`](veranode_store::WriteBatch).

pub mod block;
pub mod error;
pub mod genesis;
pub mod ledger;

pub use block::{compute_block_hash, recompute_hash, voting_digest};
pub use error::LedgerError;
pub use genesis::genesis_hash;
pub use ledger::{append, ChainReport, Ledger, LedgerStats};
