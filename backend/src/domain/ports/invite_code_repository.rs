//! Port for invite code lookup and single-use redemption.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{InviteCode, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by invite code storage.
    pub enum InviteCodeRepositoryError {
        /// The table store could not be reached.
        Connection { message: String } =>
            "invite code store connection failed: {message}",
        /// The query or update failed.
        Query { message: String } =>
            "invite code query failed: {message}",
    }
}

/// Invite code storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InviteCodeRepository: Send + Sync {
    /// The code, if it exists and is unused and unexpired at `now`.
    async fn find_redeemable(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InviteCode>, InviteCodeRepositoryError>;

    /// Mark the code used, conditioned on it still being unused.
    ///
    /// Returns `false` when no row was affected, meaning another redemption
    /// won the race or the code vanished.
    async fn redeem(
        &self,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, InviteCodeRepositoryError>;

    /// Whether `user_id` holds a redeemed code.
    async fn redeemed_by(&self, user_id: &UserId) -> Result<bool, InviteCodeRepositoryError>;
}
