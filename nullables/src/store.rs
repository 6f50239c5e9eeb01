//! Nullable store: thread-safe, transactional in-memory storage for testing.
//!
//! A batch takes the single writer lock, works on a private copy of the
//! state and swaps it in on commit, so readers never observe a partial
//! batch and a dropped batch leaves no trace. Failures can be injected into
//! ledger appends and commits.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use veranode_store::{
    LedgerBlock, LedgerStore, LifecycleStore, MetaStore, Profile, ProfileStore, Rumor,
    RumorStore, StoreError, Vote, VoteStore, WriteBatch,
};
use veranode_types::{Nullifier, ProfileId, RumorId};

#[derive(Clone, Debug, Default)]
struct NullState {
    profiles: BTreeMap<ProfileId, Profile>,
    rumors: BTreeMap<RumorId, Rumor>,
    rumor_nullifiers: HashMap<Nullifier, RumorId>,
    votes: BTreeMap<(RumorId, Nullifier), Vote>,
    ledger: BTreeMap<u64, LedgerBlock>,
    ledger_rumors: HashMap<RumorId, u64>,
    meta: HashMap<String, Vec<u8>>,
}

impl NullState {
    fn votes_for(&self, rumor: &RumorId) -> impl Iterator<Item = (&(RumorId, Nullifier), &Vote)> {
        let lo = (*rumor, Nullifier::new([0x00; 32]));
        let hi = (*rumor, Nullifier::new([0xff; 32]));
        self.votes.range(lo..=hi)
    }
}

#[derive(Debug, Default)]
struct Faults {
    fail_ledger_appends: AtomicBool,
    fail_commits: AtomicBool,
}

/// An in-memory store for testing. Clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct NullStore {
    state: Arc<RwLock<NullState>>,
    writer: Arc<Mutex<()>>,
    faults: Arc<Faults>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `append_ledger_block` fail with a backend error.
    pub fn fail_ledger_appends(&self, fail: bool) {
        self.faults.fail_ledger_appends.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `commit` fail, discarding the batch.
    pub fn fail_commits(&self, fail: bool) {
        self.faults.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Overwrite a ledger block in place, bypassing the append-only
    /// contract. For corruption tests.
    pub fn tamper_ledger_block(&self, block: LedgerBlock) {
        self.state.write().unwrap().ledger.insert(block.id, block);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, NullState> {
        self.state.read().unwrap()
    }
}

impl ProfileStore for NullStore {
    fn get_profile(&self, id: &ProfileId) -> Result<Profile, StoreError> {
        self.read()
            .profiles
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))
    }

    fn exists(&self, id: &ProfileId) -> Result<bool, StoreError> {
        Ok(self.read().profiles.contains_key(id))
    }

    fn profile_count(&self) -> Result<u64, StoreError> {
        Ok(self.read().profiles.len() as u64)
    }

    fn iter_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.read().profiles.values().cloned().collect())
    }
}

impl RumorStore for NullStore {
    fn get_rumor(&self, id: &RumorId) -> Result<Rumor, StoreError> {
        self.read()
            .rumors
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("rumor {}", id)))
    }

    fn exists(&self, id: &RumorId) -> Result<bool, StoreError> {
        Ok(self.read().rumors.contains_key(id))
    }

    fn rumor_count(&self) -> Result<u64, StoreError> {
        Ok(self.read().rumors.len() as u64)
    }

    fn iter_rumors(&self) -> Result<Vec<Rumor>, StoreError> {
        Ok(self.read().rumors.values().cloned().collect())
    }

    fn rumor_by_nullifier(&self, nullifier: &Nullifier) -> Result<Option<Rumor>, StoreError> {
        let state = self.read();
        Ok(state
            .rumor_nullifiers
            .get(nullifier)
            .and_then(|id| state.rumors.get(id))
            .cloned())
    }
}

impl VoteStore for NullStore {
    fn get_vote(&self, rumor: &RumorId, nullifier: &Nullifier) -> Result<Option<Vote>, StoreError> {
        Ok(self.read().votes.get(&(*rumor, *nullifier)).cloned())
    }

    fn votes_for_rumor(&self, rumor: &RumorId) -> Result<Vec<Vote>, StoreError> {
        Ok(self.read().votes_for(rumor).map(|(_, v)| v.clone()).collect())
    }

    fn vote_count(&self) -> Result<u64, StoreError> {
        Ok(self.read().votes.len() as u64)
    }
}

impl LedgerStore for NullStore {
    fn get_block(&self, id: u64) -> Result<LedgerBlock, StoreError> {
        self.read()
            .ledger
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("ledger block {}", id)))
    }

    fn last_block(&self) -> Result<Option<LedgerBlock>, StoreError> {
        Ok(self.read().ledger.values().next_back().cloned())
    }

    fn iter_blocks(&self) -> Result<Vec<LedgerBlock>, StoreError> {
        Ok(self.read().ledger.values().cloned().collect())
    }

    fn block_for_rumor(&self, rumor: &RumorId) -> Result<Option<LedgerBlock>, StoreError> {
        let state = self.read();
        Ok(state
            .ledger_rumors
            .get(rumor)
            .and_then(|id| state.ledger.get(id))
            .cloned())
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        Ok(self.read().ledger.len() as u64)
    }
}

impl MetaStore for NullStore {
    fn get_schema_version(&self) -> Result<Option<u32>, StoreError> {
        Ok(self
            .read()
            .meta
            .get("schema_version")
            .and_then(|b| <[u8; 4]>::try_from(b.as_slice()).ok())
            .map(u32::from_le_bytes))
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta("schema_version", &version.to_le_bytes())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read().meta.get(key).cloned())
    }

    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let _writer = self.writer.lock().unwrap();
        self.state
            .write()
            .unwrap()
            .meta
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// A write batch over a private copy of the store's state.
pub struct NullBatch<'a> {
    store: &'a NullStore,
    working: NullState,
    _writer: MutexGuard<'a, ()>,
}

impl WriteBatch for NullBatch<'_> {
    fn get_profile(&self, id: &ProfileId) -> Result<Profile, StoreError> {
        self.working
            .profiles
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))
    }

    fn put_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        self.working.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    fn get_rumor(&self, id: &RumorId) -> Result<Rumor, StoreError> {
        self.working
            .rumors
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("rumor {}", id)))
    }

    fn insert_rumor(&mut self, rumor: &Rumor) -> Result<(), StoreError> {
        if self.working.rumors.contains_key(&rumor.id) {
            return Err(StoreError::Duplicate(format!("rumor {}", rumor.id)));
        }
        if self.working.rumor_nullifiers.contains_key(&rumor.nullifier) {
            return Err(StoreError::Duplicate(format!(
                "rumor nullifier {}",
                rumor.nullifier
            )));
        }
        self.working.rumors.insert(rumor.id, rumor.clone());
        self.working
            .rumor_nullifiers
            .insert(rumor.nullifier, rumor.id);
        Ok(())
    }

    fn put_rumor(&mut self, rumor: &Rumor) -> Result<(), StoreError> {
        match self.working.rumors.get_mut(&rumor.id) {
            Some(existing) => {
                *existing = rumor.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("rumor {}", rumor.id))),
        }
    }

    fn iter_rumors(&self) -> Result<Vec<Rumor>, StoreError> {
        Ok(self.working.rumors.values().cloned().collect())
    }

    fn get_vote(&self, rumor: &RumorId, nullifier: &Nullifier) -> Result<Option<Vote>, StoreError> {
        Ok(self.working.votes.get(&(*rumor, *nullifier)).cloned())
    }

    fn votes_for_rumor(&self, rumor: &RumorId) -> Result<Vec<Vote>, StoreError> {
        Ok(self
            .working
            .votes_for(rumor)
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn insert_vote(&mut self, vote: &Vote) -> Result<(), StoreError> {
        let key = (vote.rumor_id, vote.nullifier);
        if self.working.votes.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "vote {} on rumor {}",
                vote.nullifier, vote.rumor_id
            )));
        }
        self.working.votes.insert(key, vote.clone());
        Ok(())
    }

    fn delete_votes_for_rumor(&mut self, rumor: &RumorId) -> Result<usize, StoreError> {
        let keys: Vec<(RumorId, Nullifier)> =
            self.working.votes_for(rumor).map(|(k, _)| *k).collect();
        for key in &keys {
            self.working.votes.remove(key);
        }
        Ok(keys.len())
    }

    fn last_ledger_block(&self) -> Result<Option<LedgerBlock>, StoreError> {
        Ok(self.working.ledger.values().next_back().cloned())
    }

    fn ledger_block_for_rumor(&self, rumor: &RumorId) -> Result<Option<LedgerBlock>, StoreError> {
        Ok(self
            .working
            .ledger_rumors
            .get(rumor)
            .and_then(|id| self.working.ledger.get(id))
            .cloned())
    }

    fn append_ledger_block(&mut self, block: &LedgerBlock) -> Result<(), StoreError> {
        if self.store.faults.fail_ledger_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected ledger append failure".to_string()));
        }
        if self.working.ledger.contains_key(&block.id) {
            return Err(StoreError::Duplicate(format!("ledger block {}", block.id)));
        }
        if self.working.ledger_rumors.contains_key(&block.rumor_id) {
            return Err(StoreError::Duplicate(format!(
                "ledger block for rumor {}",
                block.rumor_id
            )));
        }
        self.working.ledger.insert(block.id, block.clone());
        self.working.ledger_rumors.insert(block.rumor_id, block.id);
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        if self.store.faults.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".to_string()));
        }
        *self.store.state.write().unwrap() = self.working;
        Ok(())
    }
}

impl LifecycleStore for NullStore {
    type Profiles = NullStore;
    type Rumors = NullStore;
    type Votes = NullStore;
    type Ledger = NullStore;
    type Batch<'a> = NullBatch<'a>;

    fn profile_store(&self) -> Self::Profiles {
        self.clone()
    }

    fn rumor_store(&self) -> Self::Rumors {
        self.clone()
    }

    fn vote_store(&self) -> Self::Votes {
        self.clone()
    }

    fn ledger_store(&self) -> Self::Ledger {
        self.clone()
    }

    fn write_batch(&self) -> Result<Self::Batch<'_>, StoreError> {
        let writer = self.writer.lock().unwrap();
        let working = self.read().clone();
        Ok(NullBatch {
            store: self,
            working,
            _writer: writer,
        })
    }
}
