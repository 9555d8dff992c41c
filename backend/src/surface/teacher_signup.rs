//! Teacher registration surface.
//!
//! The invite code is checked as the user leaves the field; the result is
//! advisory only. The controller checks the code again on submit and
//! redeems it atomically.

use crate::domain::{BuildingId, FormField, INVITE_CODE_MIN_LEN, RawForm};
use crate::protocol::{InboundMessage, OutboundMessage, SurfaceKind};

use super::submission::{SubmissionState, set_text_field};
use super::view::{Banner, SelectorView, field_messages};
use super::{LoadingFlags, SelectionState, Surface};

/// What the user can do on the teacher registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeacherSignupAction {
    /// A text input changed.
    FieldChanged(FormField, String),
    /// The invite code field lost focus.
    InviteCodeBlurred,
    /// A building was picked.
    BuildingChosen(BuildingId),
    /// The form was submitted.
    Submit,
    /// Go to sign-in.
    SwitchToLogin,
    /// Go to student registration.
    SwitchToSignup,
}

/// Advisory invite code state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InviteCodeStatus {
    /// Not checked yet, or edited since.
    #[default]
    Unchecked,
    /// Check in flight.
    Checking,
    /// The controller accepted the code.
    Valid(String),
    /// The controller rejected the code.
    Invalid(String),
}

/// Rendered teacher registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherSignupView {
    /// Optional building dropdown.
    pub buildings: SelectorView,
    /// Invite code check result.
    pub invite_code: InviteCodeStatus,
    /// Whether the submit button accepts clicks.
    pub submit_enabled: bool,
    /// Inline field errors.
    pub field_errors: Vec<(FormField, String)>,
    /// Result or degraded-mode banner.
    pub banner: Option<Banner>,
}

/// Teacher registration surface state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherSignupSurface {
    form: RawForm,
    selection: SelectionState,
    loading: LoadingFlags,
    invite_code: InviteCodeStatus,
    pending_checks: usize,
    submission: SubmissionState,
}

impl Surface for TeacherSignupSurface {
    type Action = TeacherSignupAction;
    type View = TeacherSignupView;

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::TeacherSignup
    }

    fn on_mount(&mut self) -> Vec<InboundMessage> {
        vec![InboundMessage::LoadBuildingsRequest]
    }

    fn dispatch(&mut self, action: TeacherSignupAction) -> Vec<InboundMessage> {
        match action {
            TeacherSignupAction::FieldChanged(field, value) => {
                if field == FormField::InviteCode {
                    self.invite_code = InviteCodeStatus::Unchecked;
                }
                set_text_field(&mut self.form, field, value);
                Vec::new()
            }
            TeacherSignupAction::InviteCodeBlurred => {
                if self.form.invite_code.trim().chars().count() < INVITE_CODE_MIN_LEN {
                    return Vec::new();
                }
                self.invite_code = InviteCodeStatus::Checking;
                self.pending_checks += 1;
                vec![InboundMessage::ValidateInviteCode {
                    code: self.form.invite_code.clone(),
                }]
            }
            TeacherSignupAction::BuildingChosen(building_id) => {
                // Teachers pick a building only; courses are not loaded.
                self.selection.select_building(building_id);
                Vec::new()
            }
            TeacherSignupAction::Submit => {
                if !self.submission.begin() {
                    return Vec::new();
                }
                vec![InboundMessage::TeacherSignupFormSubmit(RawForm {
                    building_id: self.selection.selection().building(),
                    course_id: None,
                    group_id: None,
                    ..self.form.clone()
                })]
            }
            TeacherSignupAction::SwitchToLogin => vec![InboundMessage::SwitchToLogin],
            TeacherSignupAction::SwitchToSignup => vec![InboundMessage::SwitchToSignup],
        }
    }

    fn receive(&mut self, message: &OutboundMessage) {
        if let OutboundMessage::InviteCodeValidationResult { valid, message } = message {
            // Results arrive in request order; only the latest check for
            // the unedited code is applied.
            self.pending_checks = self.pending_checks.saturating_sub(1);
            if self.pending_checks > 0 || self.invite_code != InviteCodeStatus::Checking {
                return;
            }
            self.invite_code = if *valid {
                InviteCodeStatus::Valid(message.clone())
            } else {
                InviteCodeStatus::Invalid(message.clone())
            };
            return;
        }
        self.loading.receive(message);
        self.selection.receive(message);
        self.submission.receive(message);
    }

    fn render(&self) -> TeacherSignupView {
        TeacherSignupView {
            buildings: self.selection.building_selector(&self.loading),
            invite_code: self.invite_code.clone(),
            submit_enabled: !self.submission.is_submitting(),
            field_errors: field_messages(self.submission.errors()),
            banner: self
                .submission
                .banner()
                .cloned()
                .or_else(|| self.selection.banner()),
        }
    }
}
