//! Verdict decision and reputation settlement.

use veranode_store::{Profile, VoteTally};
use veranode_types::Verdict;

/// FACT only when FACT weight strictly exceeds LIE weight; a tie is a LIE.
pub fn decide_verdict(tally: &VoteTally) -> Verdict {
    if tally.fact_weight > tally.lie_weight {
        Verdict::Fact
    } else {
        Verdict::Lie
    }
}

/// Add `delta` to the profile's points and block it if it reaches
/// `blocking_threshold`. Returns `true` if this call blocked the profile.
///
/// Blocking is one-way: a blocked profile stays blocked whatever its points.
pub fn apply_points(profile: &mut Profile, delta: i64, blocking_threshold: i64) -> bool {
    profile.points = profile.points.saturating_add(delta);
    if !profile.is_blocked && profile.points <= blocking_threshold {
        profile.is_blocked = true;
        return true;
    }
    false
}
