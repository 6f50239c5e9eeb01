//! Ledger block records and storage trait.

use crate::{StoreError, VoteTally};
use serde::{Deserialize, Serialize};
use veranode_types::{Area, ChainHash, Nullifier, RumorId, Timestamp, Verdict};

/// Immutable snapshot of a finalized rumor, stored inside its ledger block.
///
/// Holds aggregates only. Voter identities and vote nullifiers never
/// appear here, so the record outlives the erased votes without
/// revealing who voted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub rumor_id: RumorId,
    pub content: String,
    pub area_of_vote: Area,
    pub posted_at: Timestamp,
    pub voting_ended_at: Timestamp,
    pub finalized_at: Timestamp,
    pub final_decision: Verdict,
    pub statistics: VoteTally,
    pub rumor_nullifier: Nullifier,
}

impl BlockSnapshot {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "rumorId": self.rumor_id.to_string(),
            "content": self.content,
            "areaOfVote": self.area_of_vote.as_str(),
            "postedAt": self.posted_at.as_secs(),
            "votingEndedAt": self.voting_ended_at.as_secs(),
            "finalizedAt": self.finalized_at.as_secs(),
            "finalDecision": self.final_decision.as_str(),
            "statistics": {
                "totalVotes": self.statistics.total_votes,
                "factVotes": self.statistics.fact_votes,
                "lieVotes": self.statistics.lie_votes,
                "factWeight": self.statistics.fact_weight,
                "lieWeight": self.statistics.lie_weight,
                "underAreaVotes": self.statistics.under_area_votes,
                "notUnderAreaVotes": self.statistics.not_under_area_votes,
            },
            "rumorNullifier": self.rumor_nullifier.to_string(),
        })
    }
}

/// One entry of the append-only hash chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerBlock {
    /// Position in the chain, starting at 1.
    pub id: u64,
    pub block_hash: ChainHash,
    pub previous_block_hash: ChainHash,
    pub rumor_id: RumorId,
    pub final_decision: Verdict,
    pub tally: VoteTally,
    pub timestamp: Timestamp,
    pub block_data: BlockSnapshot,
}

/// Trait for ledger storage operations.
///
/// There are deliberately no update or delete operations.
pub trait LedgerStore {
    fn get_block(&self, id: u64) -> Result<LedgerBlock, StoreError>;
    fn last_block(&self) -> Result<Option<LedgerBlock>, StoreError>;
    /// All blocks in ascending id order.
    fn iter_blocks(&self) -> Result<Vec<LedgerBlock>, StoreError>;
    fn block_for_rumor(&self, rumor: &RumorId) -> Result<Option<LedgerBlock>, StoreError>;
    fn block_count(&self) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_json_has_no_voter_fields() {
        let snapshot = BlockSnapshot {
            rumor_id: RumorId::new([7; 16]),
            content: "library closes early friday".into(),
            area_of_vote: Area::Seecs,
            posted_at: Timestamp::new(10),
            voting_ended_at: Timestamp::new(20),
            finalized_at: Timestamp::new(30),
            final_decision: Verdict::Fact,
            statistics: VoteTally::default(),
            rumor_nullifier: Nullifier::new([9; 32]),
        };
        let json = snapshot.to_json();
        assert_eq!(json["finalDecision"], "FACT");
        assert_eq!(json["areaOfVote"], "SEECS");
        let text = json.to_string();
        assert!(!text.contains("profile"));
        assert!(!text.contains("voter"));
    }
}
