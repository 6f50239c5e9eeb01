//! Locality tags.
//!
//! Every profile belongs to exactly one area and every rumor targets exactly
//! one area. A vote is "within area" when the two match.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// The fixed set of community localities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    Seecs,
    Nbs,
    Asab,
    Sines,
    Scme,
    S3h,
    General,
}

impl Area {
    pub const ALL: [Area; 7] = [
        Area::Seecs,
        Area::Nbs,
        Area::Asab,
        Area::Sines,
        Area::Scme,
        Area::S3h,
        Area::General,
    ];

    /// Canonical wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seecs => "SEECS",
            Self::Nbs => "NBS",
            Self::Asab => "ASAB",
            Self::Sines => "SINES",
            Self::Scme => "SCME",
            Self::S3h => "S3H",
            Self::General => "General",
        }
    }
}

impl FromStr for Area {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Area::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseError::InvalidArea(s.to_string()))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        for area in Area::ALL {
            assert_eq!(area.as_str().parse::<Area>().unwrap(), area);
        }
    }

    #[test]
    fn area_names_are_case_sensitive() {
        assert!("seecs".parse::<Area>().is_err());
        assert_eq!("General".parse::<Area>().unwrap(), Area::General);
    }

    #[test]
    fn unknown_area_rejected() {
        let err = "POLITICS".parse::<Area>().unwrap_err();
        assert_eq!(err, ParseError::InvalidArea("POLITICS".into()));
    }
}
