//! Registration and sign-in flows.
//!
//! Order matters for teacher signup: the invite code is checked before the
//! identity is created, so an invalid code never leaves an orphaned
//! account. Identity provider failures are normalised here; raw provider
//! text is logged but never forwarded.

use tracing::{info, warn};

use super::{FlowPhase, SessionController, ensure_profile};
use crate::domain::ports::{IdentityProviderError, MessageSink, MessageSinkError};
use crate::domain::{
    AuthIdentity, AuthSession, Error, ErrorCode, FieldErrors, IdentityMetadata, LoginForm,
    RateLimited, RawForm, Role, SignUpRequest, StudentSignup, TeacherSignup, identity_key,
};
use crate::protocol::{OutboundMessage, SurfaceKind};

const REGISTERED_SIGNED_IN: &str = "Registration successful. Welcome!";
const REGISTERED_CONFIRM_EMAIL: &str =
    "Registration successful. Check your email to confirm your account, then sign in.";
const SIGNED_IN: &str = "Signed in successfully.";
const DUPLICATE_EMAIL: &str = "An account with this email already exists. Please sign in instead.";
const DUPLICATE_TEACHER: &str = "A teacher account with this email already exists.";
const WEAK_PASSWORD: &str = "Password is too weak. Please choose a stronger password.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again later.";
const INVITE_INVALID: &str = "Invite code is invalid, used or expired.";
const INVITE_CONFLICT: &str = "This invite code has just been used. Please request a new one.";
const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const EMAIL_NOT_CONFIRMED: &str = "Please confirm your email address before signing in.";
const SIGN_IN_FAILED: &str = "Sign in failed. Please try again later.";

/// Why a submission did not succeed.
enum Rejection {
    Invalid(FieldErrors),
    Failed(Error),
}

impl From<Error> for Rejection {
    fn from(error: Error) -> Self {
        Self::Failed(error)
    }
}

impl From<FieldErrors> for Rejection {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}

/// A successful submission.
struct Accepted {
    message: &'static str,
    session: Option<AuthSession>,
}

impl SessionController {
    pub(super) async fn submit_student_signup(
        &mut self,
        form: &RawForm,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        self.enter(FlowPhase::Validating);
        let outcome = self.register_student(form).await;
        self.complete(outcome, sink).await
    }

    pub(super) async fn submit_teacher_signup(
        &mut self,
        form: &RawForm,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        self.enter(FlowPhase::Validating);
        let outcome = self.register_teacher(form).await;
        self.complete(outcome, sink).await
    }

    pub(super) async fn submit_login(
        &mut self,
        form: &RawForm,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        self.enter(FlowPhase::Validating);
        let outcome = self.sign_in(form).await;
        self.complete(outcome, sink).await
    }

    async fn register_student(&mut self, form: &RawForm) -> Result<Accepted, Rejection> {
        self.check_rate_limit(&form.email)?;
        let signup = StudentSignup::parse(form)?;
        self.enter(FlowPhase::Submitting);

        let request = SignUpRequest {
            credentials: signup.credentials,
            metadata: IdentityMetadata {
                role: Role::Student,
                first_name: signup.first_name,
                last_name: signup.last_name,
                group_id: Some(signup.group_id),
                building_id: signup.building_id,
            },
        };
        let outcome = self
            .ports
            .identity
            .sign_up(&request)
            .await
            .map_err(registration_error)?;
        self.repair_profile(&outcome.identity).await;
        Ok(registered(outcome.session))
    }

    async fn register_teacher(&mut self, form: &RawForm) -> Result<Accepted, Rejection> {
        self.check_rate_limit(&form.email)?;
        let signup = TeacherSignup::parse(form)?;
        self.enter(FlowPhase::Submitting);

        let email = signup.credentials.email().to_owned();
        let exists = self
            .ports
            .profiles
            .teacher_email_exists(&email)
            .await
            .map_err(|error| backend_failure("teacher lookup", &error))?;
        if exists {
            return Err(Error::duplicate_identity(DUPLICATE_TEACHER).into());
        }

        let now = self.clock.utc();
        let invite = self
            .ports
            .invites
            .find_redeemable(&signup.invite_code, now)
            .await
            .map_err(|error| backend_failure("invite lookup", &error))?;
        if invite.is_none() {
            return Err(Error::invite_code_invalid(INVITE_INVALID).into());
        }

        let request = SignUpRequest {
            credentials: signup.credentials,
            metadata: IdentityMetadata {
                role: Role::Teacher,
                first_name: signup.first_name,
                last_name: signup.last_name,
                group_id: None,
                building_id: signup.building_id,
            },
        };
        let outcome = self
            .ports
            .identity
            .sign_up(&request)
            .await
            .map_err(registration_error)?;

        let user_id = outcome.identity.user_id;
        let redeemed = self
            .ports
            .invites
            .redeem(&signup.invite_code, user_id, self.clock.utc())
            .await
            .map_err(|error| backend_failure("invite redemption", &error))?;
        if !redeemed {
            warn!(
                user_id = %user_id,
                "invite code redeemed concurrently; identity left without teacher record"
            );
            return Err(Error::invite_code_conflict(INVITE_CONFLICT).into());
        }

        self.repair_profile(&outcome.identity).await;
        Ok(registered(outcome.session))
    }

    async fn sign_in(&mut self, form: &RawForm) -> Result<Accepted, Rejection> {
        let login = LoginForm::parse(form)?;
        self.enter(FlowPhase::Submitting);

        let session = self
            .ports
            .identity
            .sign_in_with_password(&login.credentials)
            .await
            .map_err(sign_in_error)?;
        self.repair_profile(session.identity()).await;
        Ok(Accepted {
            message: SIGNED_IN,
            session: Some(session),
        })
    }

    fn check_rate_limit(&self, raw_email: &str) -> Result<(), Error> {
        let key = identity_key(raw_email);
        if key.is_empty() {
            return Ok(());
        }
        self.limiter
            .check_and_record(&key)
            .map_err(|limited| rate_limited(&limited))
    }

    async fn repair_profile(&mut self, identity: &AuthIdentity) {
        match ensure_profile(
            self.ports.profiles.as_ref(),
            self.ports.invites.as_ref(),
            identity,
        ).await {
            Ok(profile) => self.profile = Some(profile),
            Err(error) => warn!(
                user_id = %identity.user_id,
                error = %error,
                "profile not ensured; it will be repaired on next sign-in"
            ),
        }
    }

    async fn complete(
        &mut self,
        outcome: Result<Accepted, Rejection>,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        let delivered = match outcome {
            Ok(accepted) => {
                self.enter(FlowPhase::Succeeded);
                let signed_in = match accepted.session {
                    Some(session) => {
                        let profile = self.profile.take();
                        self.start_session(session);
                        self.profile = profile;
                        true
                    }
                    None => {
                        self.profile = None;
                        false
                    }
                };
                self.post_success(accepted.message, signed_in, sink).await
            }
            Err(Rejection::Invalid(errors)) => {
                self.enter(FlowPhase::Failed);
                info!(fields = errors.len(), "form rejected by validation");
                sink.post(OutboundMessage::ValidationErrors { errors }).await
            }
            Err(Rejection::Failed(error)) => {
                self.enter(FlowPhase::Failed);
                info!(code = error.code().as_str(), "submission failed");
                sink.post(OutboundMessage::AuthError {
                    message: error.message().to_owned(),
                    code: error.code(),
                })
                .await
            }
        };
        self.enter(FlowPhase::Idle);
        delivered
    }

    async fn post_success(
        &mut self,
        message: &str,
        signed_in: bool,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        sink.post(OutboundMessage::AuthSuccess {
            message: message.to_owned(),
        })
        .await?;
        if signed_in {
            self.mount(SurfaceKind::Dashboard, sink).await?;
        }
        Ok(())
    }
}

fn registered(session: Option<AuthSession>) -> Accepted {
    let message = if session.is_some() {
        REGISTERED_SIGNED_IN
    } else {
        REGISTERED_CONFIRM_EMAIL
    };
    Accepted { message, session }
}

fn rate_limited(limited: &RateLimited) -> Error {
    let minutes = (limited.retry_after.num_seconds() + 59) / 60;
    Error::rate_limited(format!(
        "Too many attempts. Please try again in {} minute(s).",
        minutes.max(1)
    ))
}

fn registration_error(error: IdentityProviderError) -> Rejection {
    match error {
        IdentityProviderError::AlreadyRegistered => Error::duplicate_identity(DUPLICATE_EMAIL),
        IdentityProviderError::WeakPassword { .. } => {
            Error::new(ErrorCode::WeakPassword, WEAK_PASSWORD)
        }
        other => backend_failure("registration", &other),
    }
    .into()
}

fn sign_in_error(error: IdentityProviderError) -> Rejection {
    match error {
        IdentityProviderError::InvalidCredentials => {
            Error::new(ErrorCode::InvalidCredentials, INVALID_CREDENTIALS)
        }
        IdentityProviderError::EmailNotConfirmed => {
            Error::new(ErrorCode::EmailNotConfirmed, EMAIL_NOT_CONFIRMED)
        }
        other => {
            warn!(error = %other, "sign-in failed at identity provider");
            Error::backend_unavailable(SIGN_IN_FAILED)
        }
    }
    .into()
}

fn backend_failure(step: &'static str, error: &dyn std::error::Error) -> Error {
    warn!(step, error = %error, "registration step failed");
    Error::backend_unavailable(REGISTRATION_FAILED)
}
