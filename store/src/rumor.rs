//! Rumor records and storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use veranode_types::{Area, ChainHash, Nullifier, ProfileId, RumorId, RumorState, Timestamp, Verdict};

/// An unverified claim open to community voting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rumor {
    pub id: RumorId,
    /// Posting profile; penalised when the rumor is finalized as a LIE.
    pub author: ProfileId,
    pub content: String,
    pub area_of_vote: Area,
    pub posted_at: Timestamp,
    /// Moves forward when the moderation oracle asks for an extension.
    pub voting_ends_at: Timestamp,
    pub is_locked: bool,
    pub is_final: bool,
    /// Set exactly once, together with `is_final`.
    pub final_decision: Option<Verdict>,
    /// Authorship nullifier; unique across all rumors.
    pub nullifier: Nullifier,
    /// Mirrored from the ledger block when the rumor is finalized.
    pub previous_hash: Option<ChainHash>,
    pub current_hash: Option<ChainHash>,
}

impl Rumor {
    pub fn state(&self) -> RumorState {
        RumorState::from_flags(self.is_locked, self.is_final)
    }

    /// Whether a vote arriving at `now` may be admitted.
    pub fn is_open_for_votes(&self, now: Timestamp) -> bool {
        self.state().accepts_votes() && !self.voting_ends_at.has_passed(now)
    }
}

/// Trait for rumor storage operations.
pub trait RumorStore {
    fn get_rumor(&self, id: &RumorId) -> Result<Rumor, StoreError>;
    fn exists(&self, id: &RumorId) -> Result<bool, StoreError>;
    fn rumor_count(&self) -> Result<u64, StoreError>;
    fn iter_rumors(&self) -> Result<Vec<Rumor>, StoreError>;
    fn rumor_by_nullifier(&self, nullifier: &Nullifier) -> Result<Option<Rumor>, StoreError>;

    /// Rumors currently in `state`.
    fn iter_rumors_in_state(&self, state: RumorState) -> Result<Vec<Rumor>, StoreError> {
        Ok(self
            .iter_rumors()?
            .into_iter()
            .filter(|r| r.state() == state)
            .collect())
    }
}
