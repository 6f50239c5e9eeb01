//! Schema stamping and version checks run before the node opens for
//! business.
//!
//! A fresh environment is stamped with the application marker and the
//! current schema version. An environment that already holds rows must carry
//! both, otherwise it was written by something else and is refused.

use veranode_store::{MetaStore, StoreError};

use crate::{LmdbEnvironment, LmdbError};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const APPLICATION_KEY: &str = "application";
const APPLICATION: &[u8] = b"veranode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Empty environment, now stamped.
    Initialized,
    UpToDate,
}

pub struct Migrator;

impl Migrator {
    pub fn run(env: &LmdbEnvironment) -> Result<MigrationOutcome, LmdbError> {
        let meta = env.meta_store();

        let Some(stored) = meta.get_schema_version().map_err(schema_err)? else {
            if holds_rows(env)? {
                return Err(LmdbError::Schema(
                    "environment holds data but carries no schema version".into(),
                ));
            }
            meta.put_meta(APPLICATION_KEY, APPLICATION).map_err(schema_err)?;
            meta.set_schema_version(CURRENT_SCHEMA_VERSION).map_err(schema_err)?;
            tracing::info!(version = CURRENT_SCHEMA_VERSION, "stamped new database");
            return Ok(MigrationOutcome::Initialized);
        };

        match meta.get_meta(APPLICATION_KEY).map_err(schema_err)? {
            Some(app) if app == APPLICATION => {}
            other => {
                let found = other.map(|v| String::from_utf8_lossy(&v).into_owned());
                return Err(LmdbError::Schema(format!(
                    "not a VeraNode database (application marker {found:?})"
                )));
            }
        }

        if stored != CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::Schema(format!(
                "database schema version {stored} cannot be opened by schema version {CURRENT_SCHEMA_VERSION}"
            )));
        }

        tracing::info!(version = stored, "database schema is up to date");
        Ok(MigrationOutcome::UpToDate)
    }
}

fn schema_err(e: StoreError) -> LmdbError {
    LmdbError::Schema(e.to_string())
}

fn holds_rows(env: &LmdbEnvironment) -> Result<bool, LmdbError> {
    let rtxn = env.env().read_txn()?;
    for db in [env.profiles_db, env.rumors_db, env.votes_db, env.ledger_db] {
        if db.len(&rtxn)? > 0 {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 16, 10 * 1024 * 1024).unwrap();
        (dir, env)
    }

    #[test]
    fn fresh_database_is_stamped_once() {
        let (_dir, env) = temp_env();
        assert_eq!(Migrator::run(&env).unwrap(), MigrationOutcome::Initialized);

        let meta = env.meta_store();
        assert_eq!(
            meta.get_schema_version().unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
        assert_eq!(
            meta.get_meta(APPLICATION_KEY).unwrap().as_deref(),
            Some(APPLICATION)
        );
        assert_eq!(Migrator::run(&env).unwrap(), MigrationOutcome::UpToDate);
    }

    #[test]
    fn other_schema_versions_are_refused() {
        let (_dir, env) = temp_env();
        Migrator::run(&env).unwrap();
        let meta = env.meta_store();

        meta.set_schema_version(CURRENT_SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(Migrator::run(&env), Err(LmdbError::Schema(_))));

        meta.set_schema_version(0).unwrap();
        assert!(matches!(Migrator::run(&env), Err(LmdbError::Schema(_))));
    }

    #[test]
    fn unversioned_data_is_refused() {
        let (_dir, env) = temp_env();
        let mut wtxn = env.env().write_txn().unwrap();
        env.profiles_db.put(&mut wtxn, &[1u8; 16], b"row").unwrap();
        wtxn.commit().unwrap();

        let err = Migrator::run(&env).unwrap_err();
        assert!(err.to_string().contains("no schema version"));
    }

    #[test]
    fn foreign_marker_is_refused() {
        let (_dir, env) = temp_env();
        let meta = env.meta_store();
        meta.set_schema_version(CURRENT_SCHEMA_VERSION).unwrap();
        meta.put_meta(APPLICATION_KEY, b"otherapp").unwrap();

        let err = Migrator::run(&env).unwrap_err();
        assert!(err.to_string().contains("\"otherapp\""));
    }
}
