//! Tunable lifecycle parameters.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WITHIN_AREA_THRESHOLD: f64 = 0.30;
pub const DEFAULT_VOTING_DURATION_SECS: u64 = 48 * 3600;
pub const DEFAULT_EXTENSION_SECS: u64 = 24 * 3600;
pub const DEFAULT_INITIAL_POINTS: i64 = 100;
pub const DEFAULT_CORRECT_VOTE_POINTS: i64 = 10;
pub const DEFAULT_INCORRECT_VOTE_PENALTY: i64 = -5;
pub const DEFAULT_LIE_RUMOR_PENALTY: i64 = -50;
pub const DEFAULT_BLOCKING_THRESHOLD: i64 = -100;

/// What the finalize tick does when appending a ledger block fails after
/// reputation has already been settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeFailurePolicy {
    /// Abort the tick; nothing it did is persisted.
    #[default]
    Atomic,
    /// Log the failure and keep the rumor final with settled points and
    /// its votes still stored. No ledger block exists for it.
    BestEffort,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifecycleParams {
    /// Minimum share of within-area votes needed to lock, in [0, 1].
    pub within_area_threshold: f64,
    pub voting_duration_secs: u64,
    /// How far past "now" an extension moves the voting deadline.
    pub extension_secs: u64,
    pub initial_points: i64,
    pub correct_vote_points: i64,
    pub incorrect_vote_penalty: i64,
    /// Applied to the author when a rumor is finalized as a LIE.
    pub lie_rumor_penalty: i64,
    /// Profiles at or below this many points are blocked.
    pub blocking_threshold: i64,
    pub finalize_failure_policy: FinalizeFailurePolicy,
}

impl Default for LifecycleParams {
    fn default() -> Self {
        Self {
            within_area_threshold: DEFAULT_WITHIN_AREA_THRESHOLD,
            voting_duration_secs: DEFAULT_VOTING_DURATION_SECS,
            extension_secs: DEFAULT_EXTENSION_SECS,
            initial_points: DEFAULT_INITIAL_POINTS,
            correct_vote_points: DEFAULT_CORRECT_VOTE_POINTS,
            incorrect_vote_penalty: DEFAULT_INCORRECT_VOTE_PENALTY,
            lie_rumor_penalty: DEFAULT_LIE_RUMOR_PENALTY,
            blocking_threshold: DEFAULT_BLOCKING_THRESHOLD,
            finalize_failure_policy: FinalizeFailurePolicy::Atomic,
        }
    }
}
