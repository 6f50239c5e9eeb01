//! Vote records, per-rumor aggregates and storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use veranode_types::{Nullifier, ProfileId, RumorId, Timestamp, Verdict};

/// One admitted vote. At most one exists per `(rumor_id, nullifier)`.
///
/// `weight` is computed once at admission from the voter's points at that
/// moment and never recomputed. All votes for a rumor are erased once its
/// ledger block is durably recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub rumor_id: RumorId,
    pub profile_id: ProfileId,
    pub nullifier: Nullifier,
    pub vote_type: Verdict,
    pub weight: f64,
    pub is_within_area: bool,
    pub timestamp: Timestamp,
}

/// Aggregate statistics over a rumor's votes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    pub total_votes: u64,
    pub fact_votes: u64,
    pub lie_votes: u64,
    pub fact_weight: f64,
    pub lie_weight: f64,
    pub under_area_votes: u64,
    pub not_under_area_votes: u64,
}

impl VoteTally {
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut tally = Self::default();
        for vote in votes {
            tally.total_votes += 1;
            match vote.vote_type {
                Verdict::Fact => {
                    tally.fact_votes += 1;
                    tally.fact_weight += vote.weight;
                }
                Verdict::Lie => {
                    tally.lie_votes += 1;
                    tally.lie_weight += vote.weight;
                }
            }
            if vote.is_within_area {
                tally.under_area_votes += 1;
            } else {
                tally.not_under_area_votes += 1;
            }
        }
        tally
    }

    /// Share of votes cast from inside the rumor's area. `None` with no votes.
    pub fn within_area_ratio(&self) -> Option<f64> {
        if self.total_votes == 0 {
            None
        } else {
            Some(self.under_area_votes as f64 / self.total_votes as f64)
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.fact_weight + self.lie_weight
    }

    /// FACT weight as a percentage of total weight. `None` with no weight.
    pub fn fact_percentage(&self) -> Option<f64> {
        let total = self.total_weight();
        if total == 0.0 {
            None
        } else {
            Some(self.fact_weight / total * 100.0)
        }
    }

    /// Integer FACT-weight percentage for progress displays; 0 without weight.
    pub fn progress(&self) -> u8 {
        self.fact_percentage()
            .map(|pct| pct.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0)
    }
}

/// Trait for vote storage operations.
pub trait VoteStore {
    fn get_vote(&self, rumor: &RumorId, nullifier: &Nullifier) -> Result<Option<Vote>, StoreError>;
    fn votes_for_rumor(&self, rumor: &RumorId) -> Result<Vec<Vote>, StoreError>;
    fn vote_count(&self) -> Result<u64, StoreError>;

    fn has_vote(&self, rumor: &RumorId, nullifier: &Nullifier) -> Result<bool, StoreError> {
        Ok(self.get_vote(rumor, nullifier)?.is_some())
    }

    fn tally_for_rumor(&self, rumor: &RumorId) -> Result<VoteTally, StoreError> {
        Ok(VoteTally::from_votes(&self.votes_for_rumor(rumor)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(vote_type: Verdict, weight: f64, is_within_area: bool) -> Vote {
        Vote {
            rumor_id: RumorId::new([1; 16]),
            profile_id: ProfileId::new([2; 16]),
            nullifier: Nullifier::new([3; 32]),
            vote_type,
            weight,
            is_within_area,
            timestamp: Timestamp::new(0),
        }
    }

    #[test]
    fn tally_splits_by_type_and_area() {
        let votes = vec![
            vote(Verdict::Fact, 151.0, true),
            vote(Verdict::Fact, 51.0, false),
            vote(Verdict::Lie, 51.0, false),
        ];
        let tally = VoteTally::from_votes(&votes);
        assert_eq!(tally.total_votes, 3);
        assert_eq!(tally.fact_votes, 2);
        assert_eq!(tally.lie_votes, 1);
        assert_eq!(tally.fact_weight, 202.0);
        assert_eq!(tally.lie_weight, 51.0);
        assert_eq!(tally.under_area_votes, 1);
        assert_eq!(tally.not_under_area_votes, 2);
    }

    #[test]
    fn empty_tally_has_no_ratio() {
        let tally = VoteTally::default();
        assert_eq!(tally.within_area_ratio(), None);
        assert_eq!(tally.fact_percentage(), None);
        assert_eq!(tally.progress(), 0);
    }

    #[test]
    fn progress_rounds_fact_share() {
        let votes = vec![vote(Verdict::Fact, 2.0, true), vote(Verdict::Lie, 1.0, true)];
        let tally = VoteTally::from_votes(&votes);
        assert_eq!(tally.progress(), 67);
        assert_eq!(tally.within_area_ratio(), Some(1.0));
    }
}
