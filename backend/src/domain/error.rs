//! Domain-level error types.
//!
//! These errors are transport agnostic. The session controller maps them to
//! protocol messages (`AUTH_ERROR`, `ERROR_STATE`, `LOAD_ERROR`), so the
//! message carried here is already safe to show to a user.

use serde::{Deserialize, Serialize};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Too many attempts for one identity key inside the trailing window.
    RateLimited,
    /// An account or teacher record already exists for the email.
    DuplicateIdentity,
    /// The invite code does not exist, is used, or has expired.
    InviteCodeInvalid,
    /// The invite code was redeemed concurrently by another signup.
    InviteCodeConflict,
    /// The identity provider rejected the password as too weak.
    WeakPassword,
    /// Email/password pair did not match an account.
    InvalidCredentials,
    /// The account exists but its email address is not confirmed yet.
    EmailNotConfirmed,
    /// The operation requires an authenticated session.
    NotSignedIn,
    /// The backend could not be reached or failed unexpectedly.
    BackendUnavailable,
}

impl ErrorCode {
    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::DuplicateIdentity => "duplicate_identity",
            Self::InviteCodeInvalid => "invite_code_invalid",
            Self::InviteCodeConflict => "invite_code_conflict",
            Self::WeakPassword => "weak_password",
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::NotSignedIn => "not_signed_in",
            Self::BackendUnavailable => "backend_unavailable",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use portal::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::RateLimited, "slow down");
/// assert_eq!(err.code(), ErrorCode::RateLimited);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl Error {
    /// Create a new error, panicking if validation fails.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self { code, message })
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Convenience constructor for [`ErrorCode::RateLimited`].
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, message)
    }

    /// Convenience constructor for [`ErrorCode::DuplicateIdentity`].
    pub fn duplicate_identity(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateIdentity, message)
    }

    /// Convenience constructor for [`ErrorCode::InviteCodeInvalid`].
    pub fn invite_code_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InviteCodeInvalid, message)
    }

    /// Convenience constructor for [`ErrorCode::InviteCodeConflict`].
    pub fn invite_code_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InviteCodeConflict, message)
    }

    /// Convenience constructor for [`ErrorCode::BackendUnavailable`].
    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BackendUnavailable, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        Error::try_new(value.code, value.message)
    }
}

#[cfg(test)]
mod tests;
