//! View model pieces shared by the surfaces.

use crate::domain::{FieldErrors, FormField};

/// One entry of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Identifier sent back when chosen.
    pub value: i64,
    /// Text shown to the user.
    pub label: String,
    /// Whether this entry is the current selection.
    pub selected: bool,
}

/// A dependent dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorView {
    /// Whether the user may interact with it.
    pub enabled: bool,
    /// Whether its options are being fetched.
    pub loading: bool,
    /// Entries in display order.
    pub options: Vec<SelectOption>,
}

/// Tone of a banner message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    /// Something failed.
    Error,
    /// Something degraded but usable.
    Warning,
    /// Something succeeded.
    Success,
}

/// Message shown above a form or page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Visual tone.
    pub tone: BannerTone,
    /// Text.
    pub message: String,
}

impl Banner {
    /// Error banner.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: BannerTone::Error,
            message: message.into(),
        }
    }

    /// Warning banner.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            tone: BannerTone::Warning,
            message: message.into(),
        }
    }

    /// Success banner.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            tone: BannerTone::Success,
            message: message.into(),
        }
    }
}

/// Inline field messages in field order.
#[must_use]
pub fn field_messages(errors: &FieldErrors) -> Vec<(FormField, String)> {
    errors
        .iter()
        .map(|(field, message)| (field, message.to_owned()))
        .collect()
}
