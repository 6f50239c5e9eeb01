//! LMDB implementation of ProfileStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use veranode_store::{Profile, ProfileStore, StoreError};
use veranode_types::ProfileId;

use crate::codec::decode;
use crate::LmdbError;

pub struct LmdbProfileStore {
    pub(crate) env: Arc<Env>,
    pub(crate) profiles_db: Database<Bytes, Bytes>,
}

pub(crate) fn read_profile(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    id: &ProfileId,
) -> Result<Option<Profile>, LmdbError> {
    db.get(txn, id.as_bytes())?.map(decode).transpose()
}

impl ProfileStore for LmdbProfileStore {
    fn get_profile(&self, id: &ProfileId) -> Result<Profile, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let profile = read_profile(&self.profiles_db, &rtxn, id)?
            .ok_or_else(|| LmdbError::NotFound(format!("profile {}", id)))?;
        Ok(profile)
    }

    fn exists(&self, id: &ProfileId) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .profiles_db
            .get(&rtxn, id.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(found.is_some())
    }

    fn profile_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.profiles_db.len(&rtxn).map_err(LmdbError::from)?)
    }

    fn iter_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.profiles_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut result = Vec::new();
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            result.push(decode(val)?);
        }
        Ok(result)
    }
}
