//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use veranode_store::{LifecycleStore, StoreError};

use crate::integrity::{self, IntegrityReport};
use crate::{
    LmdbError, LmdbLedgerStore, LmdbMetaStore, LmdbProfileStore, LmdbRumorStore, LmdbVoteStore,
    LmdbWriteBatch,
};

pub(crate) const PROFILES_DB: &str = "profiles";
pub(crate) const RUMORS_DB: &str = "rumors";
pub(crate) const RUMOR_NULLIFIERS_DB: &str = "rumor_nullifiers";
pub(crate) const VOTES_DB: &str = "votes";
pub(crate) const LEDGER_DB: &str = "ledger";
pub(crate) const LEDGER_RUMORS_DB: &str = "ledger_rumors";
pub(crate) const META_DB: &str = "meta";

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) profiles_db: Database<Bytes, Bytes>,
    pub(crate) rumors_db: Database<Bytes, Bytes>,
    /// authorship nullifier -> rumor id
    pub(crate) rumor_nullifiers_db: Database<Bytes, Bytes>,
    /// rumor id || vote nullifier -> vote
    pub(crate) votes_db: Database<Bytes, Bytes>,
    /// big-endian block id -> block
    pub(crate) ledger_db: Database<Bytes, Bytes>,
    /// rumor id -> big-endian block id
    pub(crate) ledger_rumors_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create {}: {}", path.display(), e)))?;

        // SAFETY: the environment is opened once per path by this process and
        // never by another process concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let profiles_db = env.create_database(&mut wtxn, Some(PROFILES_DB))?;
        let rumors_db = env.create_database(&mut wtxn, Some(RUMORS_DB))?;
        let rumor_nullifiers_db = env.create_database(&mut wtxn, Some(RUMOR_NULLIFIERS_DB))?;
        let votes_db = env.create_database(&mut wtxn, Some(VOTES_DB))?;
        let ledger_db = env.create_database(&mut wtxn, Some(LEDGER_DB))?;
        let ledger_rumors_db = env.create_database(&mut wtxn, Some(LEDGER_RUMORS_DB))?;
        let meta_db = env.create_database(&mut wtxn, Some(META_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            profiles_db,
            rumors_db,
            rumor_nullifiers_db,
            votes_db,
            ledger_db,
            ledger_rumors_db,
            meta_db,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn profile_store(&self) -> LmdbProfileStore {
        LmdbProfileStore {
            env: Arc::clone(&self.env),
            profiles_db: self.profiles_db,
        }
    }

    pub fn rumor_store(&self) -> LmdbRumorStore {
        LmdbRumorStore {
            env: Arc::clone(&self.env),
            rumors_db: self.rumors_db,
            rumor_nullifiers_db: self.rumor_nullifiers_db,
        }
    }

    pub fn vote_store(&self) -> LmdbVoteStore {
        LmdbVoteStore {
            env: Arc::clone(&self.env),
            votes_db: self.votes_db,
        }
    }

    pub fn ledger_store(&self) -> LmdbLedgerStore {
        LmdbLedgerStore {
            env: Arc::clone(&self.env),
            ledger_db: self.ledger_db,
            ledger_rumors_db: self.ledger_rumors_db,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }

    /// Begin a write batch. Dropping it without commit rolls back.
    pub fn write_batch(&self) -> Result<LmdbWriteBatch<'_>, StoreError> {
        LmdbWriteBatch::new(self)
    }

    pub fn check_integrity(&self) -> Result<IntegrityReport, LmdbError> {
        integrity::check_integrity(self)
    }

    /// Flush buffers to disk. Called on shutdown.
    pub fn sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }
}

impl LifecycleStore for LmdbEnvironment {
    type Profiles = LmdbProfileStore;
    type Rumors = LmdbRumorStore;
    type Votes = LmdbVoteStore;
    type Ledger = LmdbLedgerStore;
    type Batch<'a> = LmdbWriteBatch<'a>;

    fn profile_store(&self) -> Self::Profiles {
        LmdbEnvironment::profile_store(self)
    }

    fn rumor_store(&self) -> Self::Rumors {
        LmdbEnvironment::rumor_store(self)
    }

    fn vote_store(&self) -> Self::Votes {
        LmdbEnvironment::vote_store(self)
    }

    fn ledger_store(&self) -> Self::Ledger {
        LmdbEnvironment::ledger_store(self)
    }

    fn write_batch(&self) -> Result<Self::Batch<'_>, StoreError> {
        LmdbEnvironment::write_batch(self)
    }
}
