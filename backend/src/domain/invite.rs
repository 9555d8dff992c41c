//! Single-use invite codes gating teacher registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::auth::UserId;

/// Minimum length of a code worth looking up.
pub const INVITE_CODE_MIN_LEN: usize = 3;

/// Invite code row.
///
/// ## Invariants
/// - Once `is_used` is true it never becomes false again.
/// - `used_by` and `used_at` are set together with `is_used`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCode {
    /// The code text as typed by the user.
    pub code: String,
    /// Whether the code was already redeemed.
    pub is_used: bool,
    /// Instant after which the code is no longer accepted.
    pub expires_at: Option<DateTime<Utc>>,
    /// Identity that redeemed the code.
    pub used_by: Option<UserId>,
    /// Redemption instant.
    pub used_at: Option<DateTime<Utc>>,
}

impl InviteCode {
    /// Fresh, unused code.
    pub fn new(code: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            code: code.into(),
            is_used: false,
            expires_at,
            used_by: None,
            used_at: None,
        }
    }

    /// True when the code is unused and not expired at `now`.
    #[must_use]
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Compare-and-set redemption: marks the code used only if it is unused.
    ///
    /// Returns whether this call performed the redemption.
    pub fn redeem(&mut self, user_id: UserId, now: DateTime<Utc>) -> bool {
        if self.is_used {
            return false;
        }
        self.is_used = true;
        self.used_by = Some(user_id);
        self.used_at = Some(now);
        true
    }
}
