//! Startup consistency checks over the VeraNode tables.
//!
//! Beyond reading every table, two invariants of the write path are
//! checked: each rumor has exactly one authorship-nullifier entry, each
//! ledger block exactly one rumor index entry. Votes must belong to a
//! stored rumor.

use std::fmt;
use std::path::Path;

use heed::types::Bytes;
use heed::{Database, RoTxn};

use crate::environment::{
    LmdbEnvironment, LEDGER_DB, LEDGER_RUMORS_DB, META_DB, PROFILES_DB, RUMORS_DB,
    RUMOR_NULLIFIERS_DB, VOTES_DB,
};
use crate::LmdbError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityProblem {
    Unreadable {
        table: &'static str,
        error: String,
    },
    IndexMismatch {
        table: &'static str,
        index: &'static str,
        rows: u64,
        index_rows: u64,
    },
    OrphanVotes(u64),
}

impl fmt::Display for IntegrityProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { table, error } => write!(f, "table '{table}' unreadable: {error}"),
            Self::IndexMismatch {
                table,
                index,
                rows,
                index_rows,
            } => write!(
                f,
                "'{table}' has {rows} rows but index '{index}' has {index_rows}"
            ),
            Self::OrphanVotes(n) => write!(f, "{n} votes reference a missing rumor"),
        }
    }
}

#[derive(Debug, Default)]
pub struct IntegrityReport {
    /// Row count per readable table, in check order.
    pub tables: Vec<(&'static str, u64)>,
    pub problems: Vec<IntegrityProblem>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn rows(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, n)| *n)
    }

    pub fn total_entries(&self) -> u64 {
        self.tables.iter().map(|(_, n)| n).sum()
    }

    /// All problems on one line, for error messages.
    pub fn summary(&self) -> String {
        self.problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// (table, index) pairs written together by the batch.
const INDEXED: &[(&str, &str)] = &[
    (RUMORS_DB, RUMOR_NULLIFIERS_DB),
    (LEDGER_DB, LEDGER_RUMORS_DB),
];

pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let tables: [(&'static str, Database<Bytes, Bytes>); 7] = [
        (PROFILES_DB, env.profiles_db),
        (RUMORS_DB, env.rumors_db),
        (RUMOR_NULLIFIERS_DB, env.rumor_nullifiers_db),
        (VOTES_DB, env.votes_db),
        (LEDGER_DB, env.ledger_db),
        (LEDGER_RUMORS_DB, env.ledger_rumors_db),
        (META_DB, env.meta_db),
    ];

    let mut report = IntegrityReport::default();
    let rtxn = env.env().read_txn()?;

    for (name, db) in tables {
        match db.len(&rtxn) {
            Ok(n) => report.tables.push((name, n)),
            Err(e) => report.problems.push(IntegrityProblem::Unreadable {
                table: name,
                error: e.to_string(),
            }),
        }
    }

    for &(table, index) in INDEXED {
        if let (Some(rows), Some(index_rows)) = (report.rows(table), report.rows(index)) {
            if rows != index_rows {
                report.problems.push(IntegrityProblem::IndexMismatch {
                    table,
                    index,
                    rows,
                    index_rows,
                });
            }
        }
    }

    match orphan_votes(env, &rtxn) {
        Ok(0) => {}
        Ok(n) => report.problems.push(IntegrityProblem::OrphanVotes(n)),
        Err(e) => report.problems.push(IntegrityProblem::Unreadable {
            table: VOTES_DB,
            error: e.to_string(),
        }),
    }

    Ok(report)
}

/// Vote keys are `rumor_id || nullifier`; count those whose rumor is gone.
fn orphan_votes(env: &LmdbEnvironment, rtxn: &RoTxn<'_>) -> Result<u64, heed::Error> {
    let mut orphans = 0;
    let mut last_rumor: Option<(Vec<u8>, bool)> = None;
    for entry in env.votes_db.iter(rtxn)? {
        let (key, _) = entry?;
        let rumor = &key[..key.len().min(16)];
        let exists = match &last_rumor {
            Some((id, exists)) if id.as_slice() == rumor => *exists,
            _ => {
                let exists = env.rumors_db.get(rtxn, rumor)?.is_some();
                last_rumor = Some((rumor.to_vec(), exists));
                exists
            }
        };
        if !exists {
            orphans += 1;
        }
    }
    Ok(orphans)
}

/// Reject a data directory that exists but holds no LMDB environment.
/// A path that does not exist yet is a fresh node.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    if !path.is_dir() {
        return Err(format!("data dir {} is not a directory", path.display()));
    }
    if !path.join("data.mdb").exists() {
        return Err(format!(
            "data dir {} exists but holds no data.mdb",
            path.display()
        ));
    }
    Ok(())
}
