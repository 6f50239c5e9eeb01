//! Opaque 16-byte identifiers for profiles and rumors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{hex, ParseError};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name([u8; 16]);

        impl $name {
            pub fn new(bytes: [u8; 16]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 16] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(&self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                hex::decode::<16>(s).map(Self)
            }
        }
    };
}

opaque_id!(
    /// Pseudonymous profile identifier, issued by the account layer.
    ProfileId
);

opaque_id!(
    /// Rumor identifier. Its hex form is the scope of every nullifier tied to the rumor.
    RumorId
);
