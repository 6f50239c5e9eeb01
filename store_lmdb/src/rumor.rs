//! LMDB implementation of RumorStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use veranode_store::{Rumor, RumorStore, StoreError};
use veranode_types::{Nullifier, RumorId};

use crate::codec::{decode, decode_rumor_id};
use crate::LmdbError;

pub struct LmdbRumorStore {
    pub(crate) env: Arc<Env>,
    pub(crate) rumors_db: Database<Bytes, Bytes>,
    pub(crate) rumor_nullifiers_db: Database<Bytes, Bytes>,
}

pub(crate) fn read_rumor(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    id: &RumorId,
) -> Result<Option<Rumor>, LmdbError> {
    db.get(txn, id.as_bytes())?.map(decode).transpose()
}

pub(crate) fn read_all_rumors(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
) -> Result<Vec<Rumor>, LmdbError> {
    let mut result = Vec::new();
    for entry in db.iter(txn)? {
        let (_, val) = entry?;
        result.push(decode(val)?);
    }
    Ok(result)
}

impl RumorStore for LmdbRumorStore {
    fn get_rumor(&self, id: &RumorId) -> Result<Rumor, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let rumor = read_rumor(&self.rumors_db, &rtxn, id)?
            .ok_or_else(|| LmdbError::NotFound(format!("rumor {}", id)))?;
        Ok(rumor)
    }

    fn exists(&self, id: &RumorId) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .rumors_db
            .get(&rtxn, id.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(found.is_some())
    }

    fn rumor_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.rumors_db.len(&rtxn).map_err(LmdbError::from)?)
    }

    fn iter_rumors(&self) -> Result<Vec<Rumor>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(read_all_rumors(&self.rumors_db, &rtxn)?)
    }

    fn rumor_by_nullifier(&self, nullifier: &Nullifier) -> Result<Option<Rumor>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = match self
            .rumor_nullifiers_db
            .get(&rtxn, nullifier.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode_rumor_id(bytes)?,
            None => return Ok(None),
        };
        Ok(read_rumor(&self.rumors_db, &rtxn, &id)?)
    }
}
