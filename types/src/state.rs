//! Verdicts and rumor lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// A FACT/LIE judgement. Used both for a vote's direction and for a
/// rumor's final decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Fact,
    Lie,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fact => "FACT",
            Self::Lie => "LIE",
        }
    }
}

impl FromStr for Verdict {
    type Err = ParseError;

    /// Accepts any casing, matching how vote requests are normalised upstream.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FACT" => Ok(Self::Fact),
            "LIE" => Ok(Self::Lie),
            _ => Err(ParseError::InvalidVerdict(s.to_string())),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a rumor is in its lifecycle.
///
/// `Active -> Locked -> Finalized`, with `Locked -> Active` when the
/// moderation oracle asks for an extension. `Finalized` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RumorState {
    Active,
    Locked,
    Finalized,
}

impl RumorState {
    pub fn from_flags(is_locked: bool, is_final: bool) -> Self {
        if is_final {
            Self::Finalized
        } else if is_locked {
            Self::Locked
        } else {
            Self::Active
        }
    }

    /// Whether votes may still be admitted (deadline permitting).
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Active)
    }
}
