//! Parse errors for the textual forms of the core types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid hex: expected {expected} hex characters, got {got}")]
    InvalidHex { expected: usize, got: usize },

    #[error("unknown area: {0}")]
    InvalidArea(String),

    #[error("unknown verdict: {0} (expected FACT or LIE)")]
    InvalidVerdict(String),
}
