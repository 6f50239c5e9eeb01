use std::sync::Arc;

use proptest::prelude::*;
use veranode_ledger::{compute_block_hash, genesis_hash, Ledger};
use veranode_store::{BlockSnapshot, LedgerBlock, VoteTally, WriteBatch};
use veranode_store_lmdb::LmdbEnvironment;
use veranode_types::{Area, ChainHash, Nullifier, RumorId, Timestamp, Verdict};

fn chain(len: usize) -> Vec<LedgerBlock> {
    let mut previous = genesis_hash();
    let mut blocks = Vec::with_capacity(len);
    for i in 0..len {
        let id = i as u64 + 1;
        let rumor_id = RumorId::new([id as u8; 16]);
        let content = format!("claim {id}");
        let tally = VoteTally {
            total_votes: id,
            fact_votes: id,
            fact_weight: id as f64 * 1.5,
            ..VoteTally::default()
        };
        let hash = compute_block_hash(&rumor_id, &content, Verdict::Fact, &tally, &previous);
        blocks.push(LedgerBlock {
            id,
            block_hash: hash,
            previous_block_hash: previous,
            rumor_id,
            final_decision: Verdict::Fact,
            tally,
            timestamp: Timestamp::new(id),
            block_data: BlockSnapshot {
                rumor_id,
                content,
                area_of_vote: Area::General,
                posted_at: Timestamp::new(0),
                voting_ended_at: Timestamp::new(0),
                finalized_at: Timestamp::new(id),
                final_decision: Verdict::Fact,
                statistics: tally,
                rumor_nullifier: Nullifier::new([id as u8; 32]),
            },
        });
        previous = hash;
    }
    blocks
}

fn store(blocks: &[LedgerBlock]) -> (tempfile::TempDir, Arc<LmdbEnvironment>) {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open(dir.path(), 16, 16 * 1024 * 1024).unwrap();
    let mut batch = env.write_batch().unwrap();
    for b in blocks {
        batch.append_ledger_block(b).unwrap();
    }
    batch.commit().unwrap();
    (dir, Arc::new(env))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// An untouched chain of any length verifies.
    #[test]
    fn intact_chain_is_valid(len in 1usize..12) {
        let (_dir, env) = store(&chain(len));
        let report = Ledger::new(env).verify_integrity().unwrap();
        prop_assert!(report.valid);
        prop_assert_eq!(report.broken_at, None);
    }

    /// Corrupting any single link is reported at exactly that block.
    #[test]
    fn corrupted_link_is_located(len in 1usize..12, pick in any::<prop::sample::Index>(), byte in 1u8..=255) {
        let mut blocks = chain(len);
        let victim = pick.index(len);
        blocks[victim].previous_block_hash = ChainHash::new([byte; 32]);
        let (_dir, env) = store(&blocks);
        let report = Ledger::new(env).verify_integrity().unwrap();
        prop_assert!(!report.valid);
        prop_assert_eq!(report.broken_at, Some(victim as u64 + 1));
    }
}
