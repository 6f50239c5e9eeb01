//! Rumor lifecycle engine.
//!
//! Rumors move `ACTIVE -> LOCKED -> FINALIZED`, with an extension edge
//! `LOCKED -> ACTIVE` when the moderation oracle finds the outcome
//! ambiguous. Two ticks drive the machine:
//!
//! - the lock tick closes voting once the deadline has passed and enough
//!   votes came from inside the rumor's area;
//! - the finalize tick asks the oracle whether to extend, otherwise decides
//!   the verdict, settles reputation, appends a ledger block and erases the
//!   rumor's votes.
//!
//! Each tick is a single [`WriteBatch`](veranode_store::WriteBatch): it
//! either commits completely or not at all, and re-running it is a no-op
//! for rumors it already moved.

pub mod access;
pub mod admission;
pub mod engine;
pub mod error;
pub mod moderation;
pub mod params;
pub mod reputation;
pub mod weight;

pub use access::{require_admin, require_member_in_good_standing, AccessError, Principal};
pub use admission::{validate_content, AdmittedVote, MAX_CONTENT_CHARS, MIN_CONTENT_CHARS};
pub use engine::{FinalizeTickReport, FinalizedRumor, LifecycleEngine, LockTickReport};
pub use error::{AdmissionError, LifecycleError};
pub use moderation::{
    fallback_moderation, FallbackOracle, ModerationOracle, ModerationRequest, ModerationVerdict,
    OracleError,
};
pub use params::{FinalizeFailurePolicy, LifecycleParams};
pub use reputation::{apply_points, decide_verdict};
pub use weight::vote_weight;
