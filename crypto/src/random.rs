//! OS-backed randomness for secrets and identifiers.

use veranode_types::{ProfileId, RumorId};

use crate::CryptoError;

fn fill(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|e| CryptoError::Entropy(e.to_string()))
}

/// Generate a 64-character hexadecimal account secret.
pub fn generate_secret() -> Result<String, CryptoError> {
    let mut buf = [0u8; 32];
    fill(&mut buf)?;
    Ok(hex::encode(buf))
}

/// Generate a fresh random rumor id.
pub fn generate_rumor_id() -> Result<RumorId, CryptoError> {
    let mut buf = [0u8; 16];
    fill(&mut buf)?;
    Ok(RumorId::new(buf))
}

/// Generate a fresh random profile id.
pub fn generate_profile_id() -> Result<ProfileId, CryptoError> {
    let mut buf = [0u8; 16];
    fill(&mut buf)?;
    Ok(ProfileId::new(buf))
}
