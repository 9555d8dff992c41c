//! Identity provider over a GoTrue-style auth API.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::RestBackend;
use super::dto::{PasswordGrant, SessionDto, SignUpBody, SignUpResponseDto, UserDto};
use super::error::RestError;
use crate::domain::ports::{IdentityProvider, IdentityProviderError, SignUpOutcome};
use crate::domain::{AuthIdentity, AuthSession, Credentials, SignUpRequest};

#[async_trait]
impl IdentityProvider for RestBackend {
    async fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> Result<SignUpOutcome, IdentityProviderError> {
        let email = request.credentials.email();
        let url = self.client.endpoint("auth/v1/signup").map_err(classify)?;
        let body = SignUpBody {
            email,
            password: request.credentials.password(),
            data: &request.metadata,
        };
        let response: SignUpResponseDto = self
            .client
            .auth_post(url, None, &body)
            .await
            .map_err(classify)?;
        Ok(match response {
            SignUpResponseDto::Session(session) => {
                let identity = session.user.into_identity(email);
                SignUpOutcome {
                    session: Some(AuthSession::new(session.access_token, identity.clone())),
                    identity,
                }
            }
            SignUpResponseDto::User(user) => SignUpOutcome {
                identity: user.into_identity(email),
                session: None,
            },
        })
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, IdentityProviderError> {
        let mut url = self.client.endpoint("auth/v1/token").map_err(classify)?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let grant = PasswordGrant {
            email: credentials.email(),
            password: credentials.password(),
        };
        let session: SessionDto = self
            .client
            .auth_post(url, None, &grant)
            .await
            .map_err(classify)?;
        let identity = session.user.into_identity(credentials.email());
        Ok(AuthSession::new(session.access_token, identity))
    }

    async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<AuthIdentity, IdentityProviderError> {
        let url = self.client.endpoint("auth/v1/user").map_err(classify)?;
        let user: UserDto = self
            .client
            .auth_get(url, access_token)
            .await
            .map_err(classify)?;
        Ok(user.into_identity(""))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityProviderError> {
        let url = self.client.endpoint("auth/v1/logout").map_err(classify)?;
        self.client
            .auth_post_empty(url, access_token)
            .await
            .map_err(classify)
    }
}

/// Map an auth API failure onto the provider taxonomy.
///
/// Error codes are matched first; older deployments only send messages.
fn classify(error: RestError) -> IdentityProviderError {
    let (status, code, message) = match error {
        RestError::Status {
            status,
            code,
            message,
        } => (status, code, message),
        other if other.is_unavailable() => {
            return IdentityProviderError::unavailable(other.to_string());
        }
        other => return IdentityProviderError::rejected(other.to_string()),
    };

    let lowered = message.to_lowercase();
    match code.as_deref() {
        Some("email_not_confirmed") => IdentityProviderError::email_not_confirmed(),
        _ if lowered.contains("email not confirmed") => {
            IdentityProviderError::email_not_confirmed()
        }
        Some("user_already_exists" | "email_exists") => IdentityProviderError::already_registered(),
        _ if lowered.contains("already registered") => IdentityProviderError::already_registered(),
        Some("weak_password") => IdentityProviderError::weak_password(message),
        _ if lowered.contains("password should") => IdentityProviderError::weak_password(message),
        Some("invalid_credentials" | "invalid_grant") => {
            IdentityProviderError::invalid_credentials()
        }
        _ if lowered.contains("invalid login credentials") => {
            IdentityProviderError::invalid_credentials()
        }
        _ if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            IdentityProviderError::session_expired()
        }
        _ if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
            IdentityProviderError::unavailable(format!("status {status}: {message}"))
        }
        _ => IdentityProviderError::rejected(message),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for auth error classification.

    use super::*;
    use crate::outbound::rest::error::map_status_error;
    use rstest::rstest;

    fn status(status: StatusCode, body: &str) -> IdentityProviderError {
        classify(map_status_error(status, body.as_bytes()))
    }

    #[rstest]
    #[case::duplicate_code(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"error_code":"user_already_exists","msg":"User already registered"}"#,
        IdentityProviderError::already_registered()
    )]
    #[case::duplicate_message(
        StatusCode::BAD_REQUEST,
        r#"{"msg":"User already registered"}"#,
        IdentityProviderError::already_registered()
    )]
    #[case::weak_password(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"error_code":"weak_password","msg":"Password should contain letters"}"#,
        IdentityProviderError::weak_password("Password should contain letters")
    )]
    #[case::wrong_password(
        StatusCode::BAD_REQUEST,
        r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        IdentityProviderError::invalid_credentials()
    )]
    #[case::unconfirmed_legacy(
        StatusCode::BAD_REQUEST,
        r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#,
        IdentityProviderError::email_not_confirmed()
    )]
    #[case::expired_token(
        StatusCode::UNAUTHORIZED,
        r#"{"msg":"invalid JWT"}"#,
        IdentityProviderError::session_expired()
    )]
    #[case::outage(
        StatusCode::SERVICE_UNAVAILABLE,
        "upstream down",
        IdentityProviderError::unavailable("status 503 Service Unavailable: upstream down")
    )]
    #[case::other(
        StatusCode::BAD_REQUEST,
        r#"{"msg":"Signups not allowed for this instance"}"#,
        IdentityProviderError::rejected("Signups not allowed for this instance")
    )]
    fn classifies_auth_failures(
        #[case] code: StatusCode,
        #[case] body: &str,
        #[case] expected: IdentityProviderError,
    ) {
        assert_eq!(status(code, body), expected);
    }

    #[rstest]
    fn transport_failures_are_unavailable() {
        let error = classify(RestError::Timeout("deadline elapsed".to_owned()));
        assert!(matches!(error, IdentityProviderError::Unavailable { .. }));
    }
}
