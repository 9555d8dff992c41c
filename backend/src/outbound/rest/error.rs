//! Transport error mapping shared by the REST adapters.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::ports::{
    AcademicDirectoryError, InviteCodeRepositoryError, ProfileRepositoryError, TestCatalogueError,
};

/// Failure of one REST round trip, before port-specific classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(super) enum RestError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("status {status}: {message}")]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl RestError {
    /// Whether the backend could not be reached or failed on its side.
    pub(super) fn is_unavailable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Endpoint(_) | Self::Decode(_) => false,
        }
    }
}

/// Error body shapes returned by PostgREST and GoTrue.
#[derive(Debug, Default, Deserialize)]
struct ErrorBodyDto {
    error_code: Option<String>,
    error: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

pub(super) fn map_transport_error(error: reqwest::Error) -> RestError {
    if error.is_timeout() {
        RestError::Timeout(error.to_string())
    } else {
        RestError::Transport(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> RestError {
    let dto: ErrorBodyDto = serde_json::from_slice(body).unwrap_or_default();
    let code = dto.error_code.or(dto.error);
    let message = dto
        .msg
        .or(dto.message)
        .or(dto.error_description)
        .unwrap_or_else(|| body_preview(body));
    RestError::Status {
        status,
        code,
        message,
    }
}

pub(super) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

impl From<RestError> for AcademicDirectoryError {
    fn from(error: RestError) -> Self {
        if error.is_unavailable() {
            Self::connection(error.to_string())
        } else {
            Self::query(error.to_string())
        }
    }
}

impl From<RestError> for TestCatalogueError {
    fn from(error: RestError) -> Self {
        if error.is_unavailable() {
            Self::connection(error.to_string())
        } else {
            Self::query(error.to_string())
        }
    }
}

impl From<RestError> for InviteCodeRepositoryError {
    fn from(error: RestError) -> Self {
        if error.is_unavailable() {
            Self::connection(error.to_string())
        } else {
            Self::query(error.to_string())
        }
    }
}

impl From<RestError> for ProfileRepositoryError {
    fn from(error: RestError) -> Self {
        match &error {
            RestError::Status {
                status: StatusCode::CONFLICT,
                message,
                ..
            } => Self::duplicate(message.clone()),
            _ if error.is_unavailable() => Self::connection(error.to_string()),
            _ => Self::query(error.to_string()),
        }
    }
}
