//! Identity provider over the in-memory store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{IdentityProvider, IdentityProviderError, SignUpOutcome};
use crate::domain::{AuthIdentity, AuthSession, Credentials, SignUpRequest, UserId};

use super::{Account, MemoryBackend, Store, account_key, hop, password_digest};

/// Passwords the provider refuses regardless of length.
const WEAK_PASSWORDS: [&str; 4] = ["123456", "password", "qwerty", "111111"];

fn issue_session(store: &mut Store, identity: &AuthIdentity) -> AuthSession {
    let token = format!("mem-{}", Uuid::new_v4());
    store.tokens.insert(token.clone(), identity.user_id);
    AuthSession::new(token, identity.clone())
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> Result<SignUpOutcome, IdentityProviderError> {
        hop().await;
        let email = account_key(request.credentials.email());
        let password = request.credentials.password();
        if WEAK_PASSWORDS.contains(&password) {
            return Err(IdentityProviderError::weak_password(
                "password is too common",
            ));
        }

        let mut store = self.lock();
        if store.accounts.contains_key(&email) {
            return Err(IdentityProviderError::already_registered());
        }
        let identity = AuthIdentity {
            user_id: UserId::random(),
            email: email.clone(),
            metadata: Some(request.metadata.clone()),
        };
        let confirmed = !store.require_confirmation;
        store.accounts.insert(
            email.clone(),
            Account {
                identity: identity.clone(),
                password_digest: password_digest(&email, password),
                confirmed,
            },
        );
        let session = confirmed.then(|| issue_session(&mut store, &identity));
        Ok(SignUpOutcome { identity, session })
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, IdentityProviderError> {
        hop().await;
        let email = account_key(credentials.email());
        let mut store = self.lock();
        let account = store
            .accounts
            .get(&email)
            .filter(|account| {
                account.password_digest == password_digest(&email, credentials.password())
            })
            .cloned()
            .ok_or_else(IdentityProviderError::invalid_credentials)?;
        if !account.confirmed {
            return Err(IdentityProviderError::email_not_confirmed());
        }
        Ok(issue_session(&mut store, &account.identity))
    }

    async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<AuthIdentity, IdentityProviderError> {
        hop().await;
        let store = self.lock();
        let user_id = store
            .tokens
            .get(access_token)
            .ok_or_else(IdentityProviderError::session_expired)?;
        store
            .accounts
            .values()
            .find(|account| account.identity.user_id == *user_id)
            .map(|account| account.identity.clone())
            .ok_or_else(IdentityProviderError::session_expired)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityProviderError> {
        hop().await;
        self.lock().tokens.remove(access_token);
        Ok(())
    }
}
