//! Driven port for the external identity provider.
//!
//! Credential storage and hashing live behind this boundary. The controller
//! only sees typed outcomes; adapters classify provider responses into
//! [`IdentityProviderError`] so raw provider text never reaches a surface.

use async_trait::async_trait;

use crate::domain::{AuthIdentity, AuthSession, Credentials, SignUpRequest};

use super::define_port_error;

define_port_error! {
    /// Failures reported by the identity provider.
    pub enum IdentityProviderError {
        /// An account already exists for the email.
        AlreadyRegistered => "an account already exists for this email",
        /// The password does not meet the provider's strength policy.
        WeakPassword { message: String } => "password rejected: {message}",
        /// Email and password do not match an account.
        InvalidCredentials => "invalid login credentials",
        /// The account exists but its email is not confirmed.
        EmailNotConfirmed => "email address not confirmed",
        /// The access token is no longer accepted.
        SessionExpired => "session expired",
        /// The provider could not be reached or failed.
        Unavailable { message: String } => "identity provider unavailable: {message}",
        /// The provider rejected the request for another reason.
        Rejected { message: String } => "identity provider rejected the request: {message}",
    }
}

/// Result of an account creation.
///
/// Providers that require email confirmation create the identity without
/// issuing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// The identity that was created.
    pub identity: AuthIdentity,
    /// Session issued immediately, when confirmation is not required.
    pub session: Option<AuthSession>,
}

/// Port for account creation and authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account with signup metadata attached.
    async fn sign_up(&self, request: &SignUpRequest)
    -> Result<SignUpOutcome, IdentityProviderError>;

    /// Authenticate with email and password.
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, IdentityProviderError>;

    /// Identity behind an access token, including its latest metadata.
    async fn current_user(&self, access_token: &str)
    -> Result<AuthIdentity, IdentityProviderError>;

    /// Revoke an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityProviderError>;
}
