//! Idempotent "ensure profile exists" repair.
//!
//! Signups create the profile on a best-effort basis. When that step fails
//! the identity still carries its signup metadata, so sign-in and the
//! dashboard's recreate action can rebuild the row later. A teacher record
//! is only rebuilt for an identity that redeemed an invite code.

use tracing::{debug, info};

use crate::domain::ports::{
    InviteCodeRepository, InviteCodeRepositoryError, ProfileRepository, ProfileRepositoryError,
};
use crate::domain::{AuthIdentity, Profile, ProfileDerivationError};

/// Why a profile could not be ensured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnsureProfileError {
    /// The identity lacks the metadata or the redeemed invite needed to
    /// build a profile.
    #[error(transparent)]
    Derivation(#[from] ProfileDerivationError),
    /// Profile storage failed.
    #[error(transparent)]
    Repository(#[from] ProfileRepositoryError),
    /// The invite lookup failed.
    #[error(transparent)]
    Invites(#[from] InviteCodeRepositoryError),
}

/// Return the identity's profile, creating it from metadata when missing.
///
/// When the insert fails the profile is read once more, since a concurrent
/// repair may have inserted it first; only then is the insert error
/// reported.
pub async fn ensure_profile(
    profiles: &dyn ProfileRepository,
    invites: &dyn InviteCodeRepository,
    identity: &AuthIdentity,
) -> Result<Profile, EnsureProfileError> {
    if let Some(existing) = profiles.find_profile(&identity.user_id).await? {
        return Ok(existing);
    }

    let profile = Profile::derive_from(identity)?;
    if matches!(profile, Profile::Teacher(_)) && !invites.redeemed_by(&identity.user_id).await? {
        return Err(ProfileDerivationError::InviteNotRedeemed.into());
    }
    match profiles.insert_profile(&profile).await {
        Ok(()) => {
            info!(user_id = %identity.user_id, role = ?profile.role(), "profile created");
            Ok(profile)
        }
        Err(insert_error) => match profiles.find_profile(&identity.user_id).await {
            Ok(Some(existing)) => {
                debug!(user_id = %identity.user_id, "profile inserted concurrently");
                Ok(existing)
            }
            Ok(None) | Err(_) => Err(insert_error.into()),
        },
    }
}
