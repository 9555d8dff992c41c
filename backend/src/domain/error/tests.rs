//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn rate_limited_constructor_sets_code() {
    let err = Error::rate_limited("later");
    assert_eq!(err.code(), ErrorCode::RateLimited);
    assert_eq!(err.message(), "later");
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::WeakPassword, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
#[case(ErrorCode::InviteCodeConflict, "invite_code_conflict")]
#[case(ErrorCode::EmailNotConfirmed, "email_not_confirmed")]
#[case(ErrorCode::BackendUnavailable, "backend_unavailable")]
fn codes_serialise_as_snake_case(#[case] code: ErrorCode, #[case] expected: &str) {
    let value = serde_json::to_value(code).expect("serialise code");
    assert_eq!(value, json!(expected));
    assert_eq!(code.as_str(), expected);
}

#[rstest]
fn deserialisation_rejects_blank_messages() {
    let payload = json!({ "code": "rate_limited", "message": " " });
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err());
}

#[rstest]
fn serialises_code_and_message() {
    let err = Error::duplicate_identity("already registered");
    let value = serde_json::to_value(&err).expect("serialise error");
    assert_eq!(
        value,
        json!({ "code": "duplicate_identity", "message": "already registered" })
    );
}
