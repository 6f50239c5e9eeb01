//! LMDB implementation of LedgerStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use veranode_store::{LedgerBlock, LedgerStore, StoreError};
use veranode_types::RumorId;

use crate::codec::{block_key, decode, decode_block_id};
use crate::LmdbError;

pub struct LmdbLedgerStore {
    pub(crate) env: Arc<Env>,
    pub(crate) ledger_db: Database<Bytes, Bytes>,
    pub(crate) ledger_rumors_db: Database<Bytes, Bytes>,
}

pub(crate) fn read_last_block(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
) -> Result<Option<LedgerBlock>, LmdbError> {
    db.last(txn)?.map(|(_, val)| decode(val)).transpose()
}

pub(crate) fn read_block_for_rumor(
    ledger_db: &Database<Bytes, Bytes>,
    ledger_rumors_db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    rumor: &RumorId,
) -> Result<Option<LedgerBlock>, LmdbError> {
    let id = match ledger_rumors_db.get(txn, rumor.as_bytes())? {
        Some(bytes) => decode_block_id(bytes)?,
        None => return Ok(None),
    };
    match ledger_db.get(txn, &block_key(id))? {
        Some(val) => Ok(Some(decode(val)?)),
        None => Err(LmdbError::Corruption(format!(
            "rumor {} indexes missing block {}",
            rumor, id
        ))),
    }
}

impl LedgerStore for LmdbLedgerStore {
    fn get_block(&self, id: u64) -> Result<LedgerBlock, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .ledger_db
            .get(&rtxn, &block_key(id))
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("ledger block {}", id)))?;
        Ok(decode(val)?)
    }

    fn last_block(&self) -> Result<Option<LedgerBlock>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(read_last_block(&self.ledger_db, &rtxn)?)
    }

    fn iter_blocks(&self) -> Result<Vec<LedgerBlock>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.ledger_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut result = Vec::new();
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            result.push(decode(val)?);
        }
        Ok(result)
    }

    fn block_for_rumor(&self, rumor: &RumorId) -> Result<Option<LedgerBlock>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(read_block_for_rumor(
            &self.ledger_db,
            &self.ledger_rumors_db,
            &rtxn,
            rumor,
        )?)
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.ledger_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
