//! Profile records and storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use veranode_types::{Area, ProfileId, Timestamp};

/// A pseudonymous identity with a reputation balance.
///
/// Created at registration. Afterwards only the lifecycle engine mutates
/// `points`/`is_blocked`, plus the administrative unblock override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub area: Area,
    /// Reputation. May go negative.
    pub points: i64,
    /// Set once points fall to the blocking threshold; never cleared automatically.
    pub is_blocked: bool,
    pub created_at: Timestamp,
}

/// Trait for profile storage operations.
pub trait ProfileStore {
    fn get_profile(&self, id: &ProfileId) -> Result<Profile, StoreError>;
    fn exists(&self, id: &ProfileId) -> Result<bool, StoreError>;
    fn profile_count(&self) -> Result<u64, StoreError>;
    fn iter_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    fn iter_blocked_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self
            .iter_profiles()?
            .into_iter()
            .filter(|p| p.is_blocked)
            .collect())
    }
}
