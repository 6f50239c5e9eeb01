use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Append attempted on a rumor that is not final or already recorded.
    #[error("precondition failed: {reason}")]
    Precondition { reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] veranode_store::StoreError),
}
