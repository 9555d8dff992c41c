//! Invite codes and profiles over the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    InviteCodeRepository, InviteCodeRepositoryError, ProfileRepository, ProfileRepositoryError,
};
use crate::domain::{InviteCode, Profile, UserId};

use super::{MemoryBackend, hop};

#[async_trait]
impl InviteCodeRepository for MemoryBackend {
    async fn find_redeemable(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InviteCode>, InviteCodeRepositoryError> {
        hop().await;
        Ok(self
            .lock()
            .invites
            .get(code)
            .filter(|invite| invite.is_redeemable_at(now))
            .cloned())
    }

    async fn redeem(
        &self,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, InviteCodeRepositoryError> {
        hop().await;
        Ok(self
            .lock()
            .invites
            .get_mut(code)
            .is_some_and(|invite| invite.redeem(user_id, now)))
    }

    async fn redeemed_by(&self, user_id: &UserId) -> Result<bool, InviteCodeRepositoryError> {
        hop().await;
        Ok(self
            .lock()
            .invites
            .values()
            .any(|invite| invite.used_by == Some(*user_id)))
    }
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn find_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        hop().await;
        Ok(self.lock().profiles.get(user_id).cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        hop().await;
        let mut store = self.lock();
        if store.profiles.contains_key(profile.user_id()) {
            return Err(ProfileRepositoryError::duplicate(profile.user_id().to_string()));
        }
        store.profiles.insert(*profile.user_id(), profile.clone());
        Ok(())
    }

    async fn teacher_email_exists(&self, email: &str) -> Result<bool, ProfileRepositoryError> {
        hop().await;
        Ok(self.lock().profiles.values().any(|profile| match profile {
            Profile::Teacher(teacher) => teacher.email.eq_ignore_ascii_case(email),
            Profile::Student(_) => false,
        }))
    }
}
