//! Account-layer secrets.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The per-identity secret handed to the core by the account/session layer.
///
/// It is only ever fed into the nullifier generator. This type intentionally
/// does not implement `Serialize` or `Clone`, and its `Debug` output is
/// redacted. The bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}
