//! Block hashing.
//!
//! `block_hash = SHA-256(rumor_id || content || decision || voting_digest || previous_hash)`
//! where ids and hashes enter as lowercase hex and the decision as `FACT`/`LIE`.

use veranode_crypto::sha256_multi;
use veranode_store::{LedgerBlock, VoteTally};
use veranode_types::{ChainHash, RumorId, Verdict};

/// Deterministic string over the frozen aggregates, in fixed order:
/// total, fact and lie vote counts, then fact and lie weights.
///
/// Weights use shortest round-trip float formatting, so `151.0` stays
/// `151.0` and `0.1 + 0.2` renders as `0.30000000000000004`.
pub fn voting_digest(tally: &VoteTally) -> String {
    format!(
        "{}{}{}{:?}{:?}",
        tally.total_votes, tally.fact_votes, tally.lie_votes, tally.fact_weight, tally.lie_weight
    )
}

pub fn compute_block_hash(
    rumor_id: &RumorId,
    content: &str,
    decision: Verdict,
    tally: &VoteTally,
    previous: &ChainHash,
) -> ChainHash {
    let rumor_hex = rumor_id.to_string();
    let digest = voting_digest(tally);
    let previous_hex = previous.to_string();
    ChainHash::new(sha256_multi(&[
        rumor_hex.as_bytes(),
        content.as_bytes(),
        decision.as_str().as_bytes(),
        digest.as_bytes(),
        previous_hex.as_bytes(),
    ]))
}

/// Recompute a stored block's hash from its own snapshot and link.
pub fn recompute_hash(block: &LedgerBlock) -> ChainHash {
    compute_block_hash(
        &block.rumor_id,
        &block.block_data.content,
        block.final_decision,
        &block.tally,
        &block.previous_block_hash,
    )
}
