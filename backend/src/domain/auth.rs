//! Authentication primitives: credentials, identities and sessions.
//!
//! Passwords and access tokens are held in [`Zeroizing`] buffers and are
//! redacted from `Debug` output so they never reach the logs.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::academic::{BuildingId, GroupId};

/// Stable identifier assigned by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap a provider-issued UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Portal role. Fixed when the account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Member of a student group.
    Student,
    /// Staff member attached to a building.
    Teacher,
}

/// Signup details stored alongside the identity.
///
/// The identity provider keeps this metadata, which lets sign-in rebuild a
/// missing profile row from what the user originally submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMetadata {
    /// Role chosen at signup.
    pub role: Role,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Selected group, present for students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Selected building, optional for teachers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<BuildingId>,
}

/// Identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Provider identifier.
    pub user_id: UserId,
    /// Normalised (lowercase) email.
    pub email: String,
    /// Metadata recorded at signup, if any.
    pub metadata: Option<IdentityMetadata>,
}

/// Validated email/password pair.
///
/// ## Invariants
/// - `email` is lowercased and non-empty.
/// - `password` is non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from already sanitized parts.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Email used for lookups.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account creation request forwarded to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    /// Email and password for the new account.
    pub credentials: Credentials,
    /// Metadata recorded with the identity.
    pub metadata: IdentityMetadata,
}

/// Authenticated session held by the controller.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    access_token: Zeroizing<String>,
    identity: AuthIdentity,
}

impl AuthSession {
    /// Bundle an access token with the identity it authenticates.
    pub fn new(access_token: impl Into<String>, identity: AuthIdentity) -> Self {
        Self {
            access_token: Zeroizing::new(access_token.into()),
            identity,
        }
    }

    /// Bearer token for provider calls made on behalf of the user.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Identity the session belongs to.
    #[must_use]
    pub fn identity(&self) -> &AuthIdentity {
        &self.identity
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Authentication state published to host-side observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No session is held.
    SignedOut,
    /// A session is held for the given user.
    SignedIn(UserId),
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("ada@example.org", "hunter22");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("ada@example.org"));
        assert!(!rendered.contains("hunter22"));
    }

    #[rstest]
    fn session_debug_redacts_token() {
        let identity = AuthIdentity {
            user_id: UserId::random(),
            email: "ada@example.org".to_owned(),
            metadata: None,
        };
        let session = AuthSession::new("secret-token", identity);
        assert!(!format!("{session:?}").contains("secret-token"));
        assert_eq!(session.access_token(), "secret-token");
    }

    #[rstest]
    fn metadata_omits_absent_selections() {
        let metadata = IdentityMetadata {
            role: Role::Teacher,
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            group_id: None,
            building_id: None,
        };
        let value = serde_json::to_value(&metadata).expect("serialise metadata");
        assert_eq!(
            value,
            serde_json::json!({
                "role": "teacher",
                "firstName": "Ada",
                "lastName": "Lovelace"
            })
        );
    }
}
