//! Sign-in surface.

use crate::domain::{FormField, RawForm};
use crate::protocol::{InboundMessage, OutboundMessage, SurfaceKind};

use super::Surface;
use super::submission::{SubmissionState, set_text_field};
use super::view::{Banner, field_messages};

/// What the user can do on the sign-in form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    /// An input changed.
    FieldChanged(FormField, String),
    /// The form was submitted.
    Submit,
    /// Go to student registration.
    SwitchToSignup,
    /// Go to teacher registration.
    SwitchToTeacherSignup,
}

/// Rendered sign-in form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginView {
    /// Email as typed.
    pub email: String,
    /// Whether the submit button accepts clicks.
    pub submit_enabled: bool,
    /// Inline field errors.
    pub field_errors: Vec<(FormField, String)>,
    /// Result banner.
    pub banner: Option<Banner>,
}

/// Sign-in surface state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginSurface {
    form: RawForm,
    submission: SubmissionState,
}

impl Surface for LoginSurface {
    type Action = LoginAction;
    type View = LoginView;

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Login
    }

    fn on_mount(&mut self) -> Vec<InboundMessage> {
        Vec::new()
    }

    fn dispatch(&mut self, action: LoginAction) -> Vec<InboundMessage> {
        match action {
            LoginAction::FieldChanged(field, value) => {
                set_text_field(&mut self.form, field, value);
                Vec::new()
            }
            LoginAction::Submit => {
                if !self.submission.begin() {
                    return Vec::new();
                }
                vec![InboundMessage::LoginFormSubmit(RawForm {
                    email: self.form.email.clone(),
                    password: self.form.password.clone(),
                    ..RawForm::default()
                })]
            }
            LoginAction::SwitchToSignup => vec![InboundMessage::SwitchToSignup],
            LoginAction::SwitchToTeacherSignup => vec![InboundMessage::SwitchToTeacherSignup],
        }
    }

    fn receive(&mut self, message: &OutboundMessage) {
        self.submission.receive(message);
    }

    fn render(&self) -> LoginView {
        LoginView {
            email: self.form.email.clone(),
            submit_enabled: !self.submission.is_submitting(),
            field_errors: field_messages(self.submission.errors()),
            banner: self.submission.banner().cloned(),
        }
    }
}
