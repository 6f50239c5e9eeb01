//! Transactional write path.

use crate::{
    LedgerBlock, LedgerStore, Profile, ProfileStore, Rumor, RumorStore, StoreError, Vote,
    VoteStore,
};
use veranode_types::{Nullifier, ProfileId, RumorId};

/// One all-or-nothing write transaction.
///
/// Reads through the batch observe its own uncommitted writes. Dropping a
/// batch without calling [`commit`](WriteBatch::commit) discards every
/// write made through it.
pub trait WriteBatch {
    fn get_profile(&self, id: &ProfileId) -> Result<Profile, StoreError>;
    fn put_profile(&mut self, profile: &Profile) -> Result<(), StoreError>;

    fn get_rumor(&self, id: &RumorId) -> Result<Rumor, StoreError>;
    /// Inserts a new rumor. Fails with `Duplicate` if the id or the
    /// authorship nullifier is already present.
    fn insert_rumor(&mut self, rumor: &Rumor) -> Result<(), StoreError>;
    /// Overwrites an existing rumor. Fails with `NotFound` otherwise.
    fn put_rumor(&mut self, rumor: &Rumor) -> Result<(), StoreError>;
    fn iter_rumors(&self) -> Result<Vec<Rumor>, StoreError>;

    fn get_vote(&self, rumor: &RumorId, nullifier: &Nullifier) -> Result<Option<Vote>, StoreError>;
    fn votes_for_rumor(&self, rumor: &RumorId) -> Result<Vec<Vote>, StoreError>;
    /// Fails with `Duplicate` on an existing `(rumor_id, nullifier)`.
    fn insert_vote(&mut self, vote: &Vote) -> Result<(), StoreError>;
    /// Returns the number of votes removed.
    fn delete_votes_for_rumor(&mut self, rumor: &RumorId) -> Result<usize, StoreError>;

    fn last_ledger_block(&self) -> Result<Option<LedgerBlock>, StoreError>;
    fn ledger_block_for_rumor(&self, rumor: &RumorId) -> Result<Option<LedgerBlock>, StoreError>;
    /// Fails with `Duplicate` if the block id or its rumor is already recorded.
    fn append_ledger_block(&mut self, block: &LedgerBlock) -> Result<(), StoreError>;

    fn commit(self) -> Result<(), StoreError>;
}

/// A complete backend: read stores plus the batch type that writes to them.
pub trait LifecycleStore: Send + Sync {
    type Profiles: ProfileStore;
    type Rumors: RumorStore;
    type Votes: VoteStore;
    type Ledger: LedgerStore;
    type Batch<'a>: WriteBatch
    where
        Self: 'a;

    fn profile_store(&self) -> Self::Profiles;
    fn rumor_store(&self) -> Self::Rumors;
    fn vote_store(&self) -> Self::Votes;
    fn ledger_store(&self) -> Self::Ledger;

    fn write_batch(&self) -> Result<Self::Batch<'_>, StoreError>;
}
