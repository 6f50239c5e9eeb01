//! Moderation oracle contract and the deterministic fallback.
//!
//! The oracle decides whether a locked rumor's result is trustworthy enough
//! to finalize. Any oracle failure is absorbed by the engine, which applies
//! [`fallback_moderation`] instead, so finalization stays reproducible when
//! the oracle is degraded.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use veranode_store::VoteTally;

/// Fact-weight percentage band, inclusive, treated as "nearly tied".
pub const AMBIGUOUS_BAND: (f64, f64) = (45.0, 55.0);

/// Input passed to the oracle, by value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRequest {
    pub content: String,
    pub total_votes: u64,
    pub fact_weight: f64,
    pub lie_weight: f64,
    pub under_area_votes: u64,
}

impl ModerationRequest {
    pub fn new(content: impl Into<String>, tally: &VoteTally) -> Self {
        Self {
            content: content.into(),
            total_votes: tally.total_votes,
            fact_weight: tally.fact_weight,
            lie_weight: tally.lie_weight,
            under_area_votes: tally.under_area_votes,
        }
    }

    /// FACT share of total weight, `None` when there is no weight at all.
    pub fn fact_percentage(&self) -> Option<f64> {
        let total = self.fact_weight + self.lie_weight;
        if total == 0.0 {
            None
        } else {
            Some(self.fact_weight / total * 100.0)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    pub is_ambiguous: bool,
    pub should_extend: bool,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("moderation oracle unavailable: {0}")]
    Unavailable(String),

    #[error("moderation oracle timed out")]
    Timeout,

    #[error("invalid moderation response: {0}")]
    InvalidResponse(String),
}

/// A synchronous moderation decision source.
///
/// Called from the finalize tick, which runs on a blocking thread.
/// Implementations must bound their own latency.
pub trait ModerationOracle: Send + Sync {
    fn moderate(&self, request: &ModerationRequest) -> Result<ModerationVerdict, OracleError>;
}

/// The reference decision used whenever the oracle cannot answer.
///
/// - no votes: extend, there is nothing to decide on;
/// - no weight: not ambiguous;
/// - FACT share within 45..=55 percent: extend;
/// - anything else: finalize.
pub fn fallback_moderation(request: &ModerationRequest) -> ModerationVerdict {
    if request.total_votes == 0 {
        return ModerationVerdict {
            is_ambiguous: true,
            should_extend: true,
            reason: "No votes received".to_string(),
        };
    }
    match request.fact_percentage() {
        Some(pct) if pct >= AMBIGUOUS_BAND.0 && pct <= AMBIGUOUS_BAND.1 => ModerationVerdict {
            is_ambiguous: true,
            should_extend: true,
            reason: format!("Votes are nearly tied ({:.1}% FACT)", pct),
        },
        _ => ModerationVerdict {
            is_ambiguous: false,
            should_extend: false,
            reason: "Clear voting pattern".to_string(),
        },
    }
}

/// An oracle that always answers with [`fallback_moderation`].
///
/// Used when no external oracle is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackOracle;

impl ModerationOracle for FallbackOracle {
    fn moderate(&self, request: &ModerationRequest) -> Result<ModerationVerdict, OracleError> {
        Ok(fallback_moderation(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(total_votes: u64, fact_weight: f64, lie_weight: f64) -> ModerationRequest {
        ModerationRequest {
            content: "the shuttle schedule changes next week".into(),
            total_votes,
            fact_weight,
            lie_weight,
            under_area_votes: 0,
        }
    }

    #[test]
    fn no_votes_extends() {
        let verdict = fallback_moderation(&request(0, 0.0, 0.0));
        assert!(verdict.should_extend);
        assert!(verdict.is_ambiguous);
        assert_eq!(verdict.reason, "No votes received");
    }

    #[test]
    fn near_tie_extends() {
        assert!(fallback_moderation(&request(5, 47.0, 53.0)).should_extend);
    }

    #[test]
    fn clear_pattern_finalizes() {
        let verdict = fallback_moderation(&request(5, 70.0, 30.0));
        assert!(!verdict.should_extend);
        assert!(!verdict.is_ambiguous);
    }

    #[test]
    fn band_edges_are_inclusive() {
        assert!(fallback_moderation(&request(2, 45.0, 55.0)).should_extend);
        assert!(fallback_moderation(&request(2, 55.0, 45.0)).should_extend);
        assert!(!fallback_moderation(&request(2, 44.0, 56.0)).should_extend);
    }

    #[test]
    fn zero_weight_with_votes_is_not_ambiguous() {
        let verdict = fallback_moderation(&request(3, 0.0, 0.0));
        assert!(!verdict.should_extend);
    }

    #[test]
    fn request_serializes_camel_case() {
        let json = serde_json::to_value(request(5, 47.0, 53.0)).unwrap();
        assert_eq!(json["totalVotes"], 5);
        assert_eq!(json["underAreaVotes"], 0);
        assert!(json.get("factWeight").is_some());
    }

    #[test]
    fn fallback_oracle_never_fails() {
        assert!(FallbackOracle.moderate(&request(1, 1.0, 0.0)).is_ok());
    }
}
