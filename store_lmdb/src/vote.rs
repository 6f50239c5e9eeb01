//! LMDB implementation of VoteStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use veranode_store::{StoreError, Vote, VoteStore};
use veranode_types::{Nullifier, RumorId};

use crate::codec::{decode, vote_key};
use crate::LmdbError;

pub struct LmdbVoteStore {
    pub(crate) env: Arc<Env>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
}

pub(crate) fn read_vote(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    rumor: &RumorId,
    nullifier: &Nullifier,
) -> Result<Option<Vote>, LmdbError> {
    db.get(txn, &vote_key(rumor, nullifier))?
        .map(decode)
        .transpose()
}

pub(crate) fn read_votes_for_rumor(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    rumor: &RumorId,
) -> Result<Vec<Vote>, LmdbError> {
    let mut result = Vec::new();
    for entry in db.prefix_iter(txn, rumor.as_bytes())? {
        let (_, val) = entry?;
        result.push(decode(val)?);
    }
    Ok(result)
}

impl VoteStore for LmdbVoteStore {
    fn get_vote(&self, rumor: &RumorId, nullifier: &Nullifier) -> Result<Option<Vote>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(read_vote(&self.votes_db, &rtxn, rumor, nullifier)?)
    }

    fn votes_for_rumor(&self, rumor: &RumorId) -> Result<Vec<Vote>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(read_votes_for_rumor(&self.votes_db, &rtxn, rumor)?)
    }

    fn vote_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.votes_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
