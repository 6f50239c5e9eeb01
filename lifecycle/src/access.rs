//! Explicit authorization guards, called at the top of each operation.

use thiserror::Error;
use veranode_store::{Profile, StoreError, WriteBatch};
use veranode_types::ProfileId;

/// Who is asking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Principal {
    Member(ProfileId),
    Admin,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("profile {0} not found")]
    ProfileNotFound(ProfileId),

    #[error("profile {0} is blocked")]
    ProfileBlocked(ProfileId),

    #[error("administrator privileges required")]
    AdminRequired,

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// The profile must exist and must not be blocked. Returns it, read
/// through `batch` so the caller acts on the same snapshot.
pub fn require_member_in_good_standing<B: WriteBatch>(
    batch: &B,
    id: &ProfileId,
) -> Result<Profile, AccessError> {
    match batch.get_profile(id) {
        Ok(profile) if profile.is_blocked => Err(AccessError::ProfileBlocked(*id)),
        Ok(profile) => Ok(profile),
        Err(e) if e.is_not_found() => Err(AccessError::ProfileNotFound(*id)),
        Err(e) => Err(AccessError::Storage(e)),
    }
}

pub fn require_admin(principal: &Principal) -> Result<(), AccessError> {
    match principal {
        Principal::Admin => Ok(()),
        Principal::Member(_) => Err(AccessError::AdminRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_are_not_admins() {
        let member = Principal::Member(ProfileId::new([4; 16]));
        assert!(matches!(
            require_admin(&member),
            Err(AccessError::AdminRequired)
        ));
        assert!(require_admin(&Principal::Admin).is_ok());
    }
}
