//! Write batching: groups every store operation of one lifecycle step
//! into a single LMDB write transaction.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! batch.put_profile(&profile)?;
//! batch.insert_vote(&vote)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).

use heed::RwTxn;

use veranode_store::{LedgerBlock, Profile, Rumor, StoreError, Vote, WriteBatch};
use veranode_types::{Nullifier, ProfileId, RumorId};

use crate::codec::{block_key, encode, vote_key};
use crate::environment::LmdbEnvironment;
use crate::ledger::{read_block_for_rumor, read_last_block};
use crate::profile::read_profile;
use crate::rumor::{read_all_rumors, read_rumor};
use crate::vote::{read_vote, read_votes_for_rumor};
use crate::LmdbError;

/// A write batch backed by one LMDB write transaction.
pub struct LmdbWriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> LmdbWriteBatch<'a> {
    /// Begin a new write batch.
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }

    /// Put a meta key/value pair into the batch.
    pub fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.env
            .meta_db
            .put(&mut self.txn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        Ok(())
    }
}

impl WriteBatch for LmdbWriteBatch<'_> {
    // ── Profiles ────────────────────────────────────────────────────────

    fn get_profile(&self, id: &ProfileId) -> Result<Profile, StoreError> {
        let profile = read_profile(&self.env.profiles_db, &self.txn, id)?
            .ok_or_else(|| LmdbError::NotFound(format!("profile {}", id)))?;
        Ok(profile)
    }

    fn put_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        let bytes = encode(profile)?;
        self.env
            .profiles_db
            .put(&mut self.txn, profile.id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Rumors ──────────────────────────────────────────────────────────

    fn get_rumor(&self, id: &RumorId) -> Result<Rumor, StoreError> {
        let rumor = read_rumor(&self.env.rumors_db, &self.txn, id)?
            .ok_or_else(|| LmdbError::NotFound(format!("rumor {}", id)))?;
        Ok(rumor)
    }

    fn insert_rumor(&mut self, rumor: &Rumor) -> Result<(), StoreError> {
        let rumors_db = self.env.rumors_db;
        let nullifiers_db = self.env.rumor_nullifiers_db;

        if rumors_db
            .get(&self.txn, rumor.id.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(LmdbError::Duplicate(format!("rumor {}", rumor.id)).into());
        }
        if nullifiers_db
            .get(&self.txn, rumor.nullifier.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(LmdbError::Duplicate(format!("rumor nullifier {}", rumor.nullifier)).into());
        }

        let bytes = encode(rumor)?;
        rumors_db
            .put(&mut self.txn, rumor.id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        nullifiers_db
            .put(&mut self.txn, rumor.nullifier.as_bytes(), rumor.id.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_rumor(&mut self, rumor: &Rumor) -> Result<(), StoreError> {
        let rumors_db = self.env.rumors_db;
        if rumors_db
            .get(&self.txn, rumor.id.as_bytes())
            .map_err(LmdbError::from)?
            .is_none()
        {
            return Err(LmdbError::NotFound(format!("rumor {}", rumor.id)).into());
        }
        let bytes = encode(rumor)?;
        rumors_db
            .put(&mut self.txn, rumor.id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_rumors(&self) -> Result<Vec<Rumor>, StoreError> {
        Ok(read_all_rumors(&self.env.rumors_db, &self.txn)?)
    }

    // ── Votes ───────────────────────────────────────────────────────────

    fn get_vote(&self, rumor: &RumorId, nullifier: &Nullifier) -> Result<Option<Vote>, StoreError> {
        Ok(read_vote(&self.env.votes_db, &self.txn, rumor, nullifier)?)
    }

    fn votes_for_rumor(&self, rumor: &RumorId) -> Result<Vec<Vote>, StoreError> {
        Ok(read_votes_for_rumor(&self.env.votes_db, &self.txn, rumor)?)
    }

    fn insert_vote(&mut self, vote: &Vote) -> Result<(), StoreError> {
        let votes_db = self.env.votes_db;
        let key = vote_key(&vote.rumor_id, &vote.nullifier);
        if votes_db
            .get(&self.txn, &key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(LmdbError::Duplicate(format!(
                "vote {} on rumor {}",
                vote.nullifier, vote.rumor_id
            ))
            .into());
        }
        let bytes = encode(vote)?;
        votes_db
            .put(&mut self.txn, &key, &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_votes_for_rumor(&mut self, rumor: &RumorId) -> Result<usize, StoreError> {
        let votes_db = self.env.votes_db;
        let mut keys = Vec::new();
        for entry in votes_db
            .prefix_iter(&self.txn, rumor.as_bytes())
            .map_err(LmdbError::from)?
        {
            let (key, _) = entry.map_err(LmdbError::from)?;
            keys.push(key.to_vec());
        }
        for key in &keys {
            votes_db
                .delete(&mut self.txn, key)
                .map_err(LmdbError::from)?;
        }
        Ok(keys.len())
    }

    // ── Ledger ──────────────────────────────────────────────────────────

    fn last_ledger_block(&self) -> Result<Option<LedgerBlock>, StoreError> {
        Ok(read_last_block(&self.env.ledger_db, &self.txn)?)
    }

    fn ledger_block_for_rumor(&self, rumor: &RumorId) -> Result<Option<LedgerBlock>, StoreError> {
        Ok(read_block_for_rumor(
            &self.env.ledger_db,
            &self.env.ledger_rumors_db,
            &self.txn,
            rumor,
        )?)
    }

    fn append_ledger_block(&mut self, block: &LedgerBlock) -> Result<(), StoreError> {
        let ledger_db = self.env.ledger_db;
        let ledger_rumors_db = self.env.ledger_rumors_db;
        let key = block_key(block.id);

        if ledger_db
            .get(&self.txn, &key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(LmdbError::Duplicate(format!("ledger block {}", block.id)).into());
        }
        if ledger_rumors_db
            .get(&self.txn, block.rumor_id.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(
                LmdbError::Duplicate(format!("ledger block for rumor {}", block.rumor_id)).into(),
            );
        }

        let bytes = encode(block)?;
        ledger_db
            .put(&mut self.txn, &key, &bytes)
            .map_err(LmdbError::from)?;
        ledger_rumors_db
            .put(&mut self.txn, block.rumor_id.as_bytes(), &key)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Commit / rollback ───────────────────────────────────────────────

    /// Commit all batched operations in a single write transaction.
    fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
