//! Outstanding-submission tracking shared by the form surfaces.

use tracing::debug;

use crate::domain::{FieldErrors, FormField, RawForm};
use crate::protocol::OutboundMessage;

use super::view::Banner;

/// State of a form's submit button and its feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    submitting: bool,
    errors: FieldErrors,
    banner: Option<Banner>,
    succeeded: bool,
}

impl SubmissionState {
    /// Start a submission. Returns `false`, changing nothing, while a
    /// previous one is still outstanding.
    pub fn begin(&mut self) -> bool {
        if self.submitting {
            debug!("submit ignored while a submission is outstanding");
            return false;
        }
        self.submitting = true;
        self.errors = FieldErrors::default();
        self.banner = None;
        true
    }

    /// Apply a submission result; returns whether the message was one.
    pub fn receive(&mut self, message: &OutboundMessage) -> bool {
        match message {
            OutboundMessage::ValidationErrors { errors } => {
                self.errors = errors.clone();
            }
            OutboundMessage::AuthError { message, .. } => {
                self.banner = Some(Banner::error(message.clone()));
            }
            OutboundMessage::AuthSuccess { message } => {
                self.banner = Some(Banner::success(message.clone()));
                self.succeeded = true;
            }
            _ => return false,
        }
        self.submitting = false;
        true
    }

    /// Whether a submission is outstanding.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the last submission succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Inline errors from the last validation.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Banner from the last result.
    #[must_use]
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }
}

/// Write a text input into a raw form. Selector fields are set through the
/// selection state instead and are ignored here.
pub(super) fn set_text_field(form: &mut RawForm, field: FormField, value: String) {
    match field {
        FormField::Email => form.email = value,
        FormField::Password => form.password = value,
        FormField::FirstName => form.first_name = value,
        FormField::LastName => form.last_name = value,
        FormField::InviteCode => form.invite_code = value,
        FormField::Group => {}
    }
}
