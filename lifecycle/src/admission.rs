//! Rumor posting and vote admission inputs/outputs.

use crate::AdmissionError;
use veranode_types::Nullifier;

pub const MIN_CONTENT_CHARS: usize = 10;
pub const MAX_CONTENT_CHARS: usize = 5000;

/// What the caller learns about an admitted vote.
#[derive(Clone, Debug, PartialEq)]
pub struct AdmittedVote {
    pub nullifier: Nullifier,
    pub weight: f64,
    pub is_within_area: bool,
}

/// Trim `content` and check its length in characters.
pub fn validate_content(content: &str) -> Result<&str, AdmissionError> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if len < MIN_CONTENT_CHARS {
        return Err(AdmissionError::InvalidContent(format!(
            "content must be at least {} characters",
            MIN_CONTENT_CHARS
        )));
    }
    if len > MAX_CONTENT_CHARS {
        return Err(AdmissionError::InvalidContent(format!(
            "content must be at most {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_trimmed() {
        assert_eq!(
            validate_content("   the lab opens at nine   ").unwrap(),
            "the lab opens at nine"
        );
    }

    #[test]
    fn short_content_rejected_after_trim() {
        assert!(validate_content("    short    ").is_err());
        assert!(validate_content("exactly 10").is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(&accented).is_ok());
        assert!(validate_content(&format!("{accented}é")).is_err());
    }
}
