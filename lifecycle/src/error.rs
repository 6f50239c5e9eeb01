use thiserror::Error;

use crate::AccessError;
use veranode_crypto::CryptoError;
use veranode_ledger::LedgerError;
use veranode_store::StoreError;
use veranode_types::{ProfileId, RumorId};

/// Rejections surfaced to the member who made the request.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("already voted on this rumor")]
    AlreadyVoted,

    #[error("voting is closed for rumor {0}")]
    VotingClosed(RumorId),

    #[error("rumor {0} not found")]
    RumorNotFound(RumorId),

    #[error("invalid content: {0}")]
    InvalidContent(String),

    #[error("this rumor was already posted")]
    DuplicateRumor,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Operational failures of ticks and administrative actions.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("profile {0} is not blocked")]
    NotBlocked(ProfileId),
}
