use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] veranode_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] veranode_store_lmdb::LmdbError),

    #[error("database integrity check failed: {0}")]
    Integrity(String),

    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] veranode_lifecycle::LifecycleError),

    #[error("rejected: {0}")]
    Admission(#[from] veranode_lifecycle::AdmissionError),

    #[error("oracle error: {0}")]
    Oracle(#[from] veranode_lifecycle::OracleError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("node not started")]
    NotStarted,

    #[error("node already started")]
    AlreadyStarted,

    #[error("shutdown timeout")]
    ShutdownTimeout,
}
