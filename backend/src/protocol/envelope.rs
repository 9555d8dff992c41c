//! The `{ type, data }` envelope and inbound decoding.
//!
//! Decoding happens in two steps: the envelope first, then the payload for
//! the named type. An unknown type and a bad payload for a known type are
//! reported separately so callers can log them at different levels; both
//! are dropped without a reply.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{BuildingId, CourseId, GroupId, RawForm, TestId};
use crate::protocol::InboundMessage;

/// Undecoded message as received from a surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Payload; absent for messages without one.
    #[serde(default)]
    pub data: Value,
}

/// Reasons an envelope cannot become an [`InboundMessage`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The value is not a `{ type, data }` object.
    #[error("message is not an envelope: {0}")]
    NotAnEnvelope(#[source] serde_json::Error),
    /// The type is not part of the protocol.
    #[error("unknown message type {0}")]
    UnknownType(String),
    /// The payload does not match the type.
    #[error("malformed {message_type} payload: {source}")]
    MalformedPayload {
        /// Type whose payload failed.
        message_type: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildingPayload {
    building_id: BuildingId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoursePayload {
    course_id: CourseId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupPayload {
    group_id: GroupId,
}

#[derive(Deserialize)]
struct InviteCodePayload {
    code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartTestPayload {
    test_id: TestId,
}

fn payload<T: DeserializeOwned>(message_type: &'static str, data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::MalformedPayload {
        message_type,
        source,
    })
}

/// Decode a raw JSON value into an inbound message.
pub fn decode_inbound(value: Value) -> Result<InboundMessage, DecodeError> {
    let envelope: Envelope = serde_json::from_value(value).map_err(DecodeError::NotAnEnvelope)?;
    decode_envelope(envelope)
}

/// Decode an already parsed envelope.
///
/// Payload-less messages ignore whatever `data` carries.
pub fn decode_envelope(envelope: Envelope) -> Result<InboundMessage, DecodeError> {
    let Envelope { message_type, data } = envelope;
    let message = match message_type.as_str() {
        "LOAD_BUILDINGS_REQUEST" => InboundMessage::LoadBuildingsRequest,
        "BUILDING_SELECTED" => {
            let BuildingPayload { building_id } = payload("BUILDING_SELECTED", data)?;
            InboundMessage::BuildingSelected { building_id }
        }
        "COURSE_SELECTED" => {
            let CoursePayload { course_id } = payload("COURSE_SELECTED", data)?;
            InboundMessage::CourseSelected { course_id }
        }
        "GROUP_SELECTED" => {
            let GroupPayload { group_id } = payload("GROUP_SELECTED", data)?;
            InboundMessage::GroupSelected { group_id }
        }
        "VALIDATE_INVITE_CODE" => {
            let InviteCodePayload { code } = payload("VALIDATE_INVITE_CODE", data)?;
            InboundMessage::ValidateInviteCode { code }
        }
        "STUDENT_SIGNUP_FORM_SUBMIT" => InboundMessage::StudentSignupFormSubmit(payload::<RawForm>(
            "STUDENT_SIGNUP_FORM_SUBMIT",
            data,
        )?),
        "TEACHER_SIGNUP_FORM_SUBMIT" => InboundMessage::TeacherSignupFormSubmit(payload::<RawForm>(
            "TEACHER_SIGNUP_FORM_SUBMIT",
            data,
        )?),
        "LOGIN_FORM_SUBMIT" => {
            InboundMessage::LoginFormSubmit(payload::<RawForm>("LOGIN_FORM_SUBMIT", data)?)
        }
        "SWITCH_TO_LOGIN" => InboundMessage::SwitchToLogin,
        "SWITCH_TO_SIGNUP" => InboundMessage::SwitchToSignup,
        "SWITCH_TO_TEACHER_SIGNUP" => InboundMessage::SwitchToTeacherSignup,
        "SWITCH_TO_DASHBOARD" => InboundMessage::SwitchToDashboard,
        "LOAD_PROFILE_REQUEST" => InboundMessage::LoadProfileRequest,
        "LOAD_TESTS_REQUEST" => InboundMessage::LoadTestsRequest,
        "LOGOUT_REQUEST" => InboundMessage::LogoutRequest,
        "RECREATE_PROFILE_REQUEST" => InboundMessage::RecreateProfileRequest,
        "START_TEST_REQUEST" => {
            let StartTestPayload { test_id } = payload("START_TEST_REQUEST", data)?;
            InboundMessage::StartTestRequest { test_id }
        }
        _ => return Err(DecodeError::UnknownType(message_type)),
    };
    Ok(message)
}
