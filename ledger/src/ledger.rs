//! Ledger append path and read-side queries.

use std::sync::Arc;

use veranode_store::{
    BlockSnapshot, LedgerBlock, LedgerStore, LifecycleStore, Rumor, RumorStore, StoreError,
    VoteTally, WriteBatch,
};
use veranode_types::{ChainHash, RumorId, Timestamp, Verdict};

use crate::block::{compute_block_hash, recompute_hash};
use crate::genesis::genesis_hash;
use crate::LedgerError;

/// Append a block for a finalized rumor inside `batch`.
///
/// The previous hash is read through the batch, so several appends in one
/// batch chain onto each other. On success the block's hashes are mirrored
/// onto `rumor` and the rumor is written back through the batch.
pub fn append<B: WriteBatch>(
    batch: &mut B,
    rumor: &mut Rumor,
    tally: &VoteTally,
    now: Timestamp,
) -> Result<LedgerBlock, LedgerError> {
    if !rumor.is_final {
        return Err(LedgerError::Precondition {
            reason: format!("rumor {} is not final", rumor.id),
        });
    }
    let decision = rumor.final_decision.ok_or_else(|| LedgerError::Precondition {
        reason: format!("rumor {} is final without a decision", rumor.id),
    })?;
    if batch.ledger_block_for_rumor(&rumor.id)?.is_some() {
        return Err(LedgerError::Precondition {
            reason: format!("rumor {} already has a ledger block", rumor.id),
        });
    }

    let (id, previous) = match batch.last_ledger_block()? {
        Some(last) => (last.id + 1, last.block_hash),
        None => (1, genesis_hash()),
    };
    let block_hash = compute_block_hash(&rumor.id, &rumor.content, decision, tally, &previous);

    let block = LedgerBlock {
        id,
        block_hash,
        previous_block_hash: previous,
        rumor_id: rumor.id,
        final_decision: decision,
        tally: *tally,
        timestamp: now,
        block_data: BlockSnapshot {
            rumor_id: rumor.id,
            content: rumor.content.clone(),
            area_of_vote: rumor.area_of_vote,
            posted_at: rumor.posted_at,
            voting_ended_at: rumor.voting_ends_at,
            finalized_at: now,
            final_decision: decision,
            statistics: *tally,
            rumor_nullifier: rumor.nullifier,
        },
    };
    batch.append_ledger_block(&block)?;

    rumor.previous_hash = Some(previous);
    rumor.current_hash = Some(block_hash);
    batch.put_rumor(rumor)?;

    tracing::debug!(block = id, rumor = %rumor.id, hash = %block_hash, "appended ledger block");
    Ok(block)
}

/// Result of walking the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainReport {
    pub valid: bool,
    /// Id of the first block whose link or hash does not match.
    pub broken_at: Option<u64>,
}

/// Chain-wide statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerStats {
    pub total_blocks: u64,
    pub fact_decisions: u64,
    pub lie_decisions: u64,
    pub chain_valid: bool,
    pub broken_at: Option<u64>,
}

/// Read-side view of the ledger.
pub struct Ledger<S> {
    store: Arc<S>,
}

impl<S: LifecycleStore> Ledger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Hash of the most recent block, or `None` for an empty ledger.
    pub fn last_block_hash(&self) -> Result<Option<ChainHash>, StoreError> {
        Ok(self.store.ledger_store().last_block()?.map(|b| b.block_hash))
    }

    pub fn blocks(&self) -> Result<Vec<LedgerBlock>, StoreError> {
        self.store.ledger_store().iter_blocks()
    }

    pub fn block_for_rumor(&self, rumor: &RumorId) -> Result<Option<LedgerBlock>, StoreError> {
        self.store.ledger_store().block_for_rumor(rumor)
    }

    /// Walk blocks in ascending id order. The first block must link to
    /// genesis and every later block to its predecessor's hash; each
    /// block's own hash must match its recomputation. The link is checked
    /// before the hash.
    pub fn verify_integrity(&self) -> Result<ChainReport, StoreError> {
        let blocks = self.store.ledger_store().iter_blocks()?;
        Ok(walk_chain(&blocks))
    }

    pub fn stats(&self) -> Result<LedgerStats, StoreError> {
        let blocks = self.store.ledger_store().iter_blocks()?;
        let report = walk_chain(&blocks);
        let fact_decisions = blocks
            .iter()
            .filter(|b| b.final_decision == Verdict::Fact)
            .count() as u64;
        Ok(LedgerStats {
            total_blocks: blocks.len() as u64,
            fact_decisions,
            lie_decisions: blocks.len() as u64 - fact_decisions,
            chain_valid: report.valid,
            broken_at: report.broken_at,
        })
    }

    /// Aggregates that may be shown for a rumor.
    ///
    /// Hidden (`None`) until the rumor is final; afterwards they come from
    /// the ledger block since the votes themselves have been erased.
    pub fn published_tally(&self, rumor: &RumorId) -> Result<Option<VoteTally>, StoreError> {
        let rumor = self.store.rumor_store().get_rumor(rumor)?;
        if !rumor.is_final {
            return Ok(None);
        }
        Ok(self
            .store
            .ledger_store()
            .block_for_rumor(&rumor.id)?
            .map(|b| b.tally))
    }
}

fn walk_chain(blocks: &[LedgerBlock]) -> ChainReport {
    let mut expected_previous = genesis_hash();
    for block in blocks {
        if block.previous_block_hash != expected_previous || recompute_hash(block) != block.block_hash {
            tracing::warn!(block = block.id, "ledger chain broken");
            return ChainReport {
                valid: false,
                broken_at: Some(block.id),
            };
        }
        expected_previous = block.block_hash;
    }
    ChainReport {
        valid: true,
        broken_at: None,
    }
}
