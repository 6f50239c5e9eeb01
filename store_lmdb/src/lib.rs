//! LMDB storage backend for VeraNode.
//!
//! Implements all storage traits from `veranode-store` using the `heed` LMDB bindings.
//! Each logical store maps to one or more LMDB databases within a single environment.

mod codec;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod ledger;
pub mod meta;
pub mod migration;
pub mod profile;
pub mod rumor;
pub mod vote;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityProblem, IntegrityReport};
pub use ledger::LmdbLedgerStore;
pub use meta::LmdbMetaStore;
pub use migration::{MigrationOutcome, Migrator, CURRENT_SCHEMA_VERSION};
pub use profile::LmdbProfileStore;
pub use rumor::LmdbRumorStore;
pub use vote::LmdbVoteStore;
pub use write_batch::LmdbWriteBatch;
