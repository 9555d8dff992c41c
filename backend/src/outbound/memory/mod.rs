//! In-memory backend for development and tests.
//!
//! One [`MemoryBackend`] implements every backend port over a shared store.
//! Each call yields to the scheduler once before touching the store, so
//! interleavings look like real network hops; the store lock is never held
//! across an await. Invite redemption is a compare-and-set under that lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::domain::{
    AuthIdentity, Building, Course, Group, IdentityMetadata, InviteCode, PortalPorts, Profile,
    TestScope, TestSummary, UserId,
};

mod directory;
mod identity;
mod records;
mod seed;

pub use seed::DEMO_INVITE_CODE;

/// A registered identity with its password digest.
#[derive(Debug, Clone)]
struct Account {
    identity: AuthIdentity,
    password_digest: String,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct Store {
    directory_offline: bool,
    require_confirmation: bool,
    buildings: Vec<Building>,
    courses: Vec<Course>,
    groups: Vec<Group>,
    tests: Vec<(TestScope, TestSummary)>,
    invites: HashMap<String, InviteCode>,
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, UserId>,
    profiles: HashMap<UserId, Profile>,
}

/// Shared in-memory implementation of every backend port.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
}

impl MemoryBackend {
    /// Empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend holding the demo campus used in development mode.
    #[must_use]
    pub fn seeded() -> Self {
        seed::demo_campus(Self::new())
    }

    /// Every port, backed by this store.
    #[must_use]
    pub fn ports(&self) -> PortalPorts {
        PortalPorts {
            directory: Arc::new(self.clone()),
            identity: Arc::new(self.clone()),
            invites: Arc::new(self.clone()),
            profiles: Arc::new(self.clone()),
            tests: Arc::new(self.clone()),
        }
    }

    /// Add a building.
    #[must_use]
    pub fn with_building(self, building: Building) -> Self {
        self.lock().buildings.push(building);
        self
    }

    /// Add a course.
    #[must_use]
    pub fn with_course(self, course: Course) -> Self {
        self.lock().courses.push(course);
        self
    }

    /// Add a group.
    #[must_use]
    pub fn with_group(self, group: Group) -> Self {
        self.lock().groups.push(group);
        self
    }

    /// Publish a test to a group or building.
    #[must_use]
    pub fn with_test(self, scope: TestScope, test: TestSummary) -> Self {
        self.lock().tests.push((scope, test));
        self
    }

    /// Add an unused invite code.
    #[must_use]
    pub fn with_invite(self, code: &str, expires_at: Option<DateTime<Utc>>) -> Self {
        self.lock()
            .invites
            .insert(code.to_owned(), InviteCode::new(code, expires_at));
        self
    }

    /// Add a confirmed account without a profile row.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, metadata: IdentityMetadata) -> Self {
        let email = account_key(email);
        let identity = AuthIdentity {
            user_id: UserId::random(),
            email: email.clone(),
            metadata: Some(metadata),
        };
        self.lock().accounts.insert(
            email.clone(),
            Account {
                identity,
                password_digest: password_digest(&email, password),
                confirmed: true,
            },
        );
        self
    }

    /// Signups create unconfirmed accounts without a session.
    #[must_use]
    pub fn requiring_email_confirmation(self) -> Self {
        self.lock().require_confirmation = true;
        self
    }

    /// Make directory reads fail, or succeed again.
    pub fn set_directory_offline(&self, offline: bool) {
        self.lock().directory_offline = offline;
    }

    /// Mark an account's email as confirmed. Returns whether it exists.
    pub fn confirm_email(&self, email: &str) -> bool {
        self.lock()
            .accounts
            .get_mut(&account_key(email))
            .map(|account| account.confirmed = true)
            .is_some()
    }

    /// Snapshot of an invite code.
    #[must_use]
    pub fn invite(&self, code: &str) -> Option<InviteCode> {
        self.lock().invites.get(code).cloned()
    }

    /// Identity registered for an email.
    #[must_use]
    pub fn identity_for(&self, email: &str) -> Option<AuthIdentity> {
        self.lock()
            .accounts
            .get(&account_key(email))
            .map(|account| account.identity.clone())
    }

    /// Stored profile of an identity.
    #[must_use]
    pub fn profile_of(&self, user_id: &UserId) -> Option<Profile> {
        self.lock().profiles.get(user_id).cloned()
    }

    /// Drop a profile row, as an interrupted signup would leave it.
    pub fn remove_profile(&self, user_id: &UserId) -> Option<Profile> {
        self.lock().profiles.remove(user_id)
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Models the network hop of a real backend call.
async fn hop() {
    tokio::task::yield_now().await;
}

/// Accounts are keyed case-insensitively, as hosted providers do.
fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn password_digest(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update([0]);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
