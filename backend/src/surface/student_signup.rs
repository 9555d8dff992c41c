//! Student registration surface with the building → course → group chain.

use crate::domain::{BuildingId, CourseId, FormField, GroupId, RawForm};
use crate::protocol::{InboundMessage, OutboundMessage, SurfaceKind};

use super::submission::{SubmissionState, set_text_field};
use super::view::{Banner, SelectorView, field_messages};
use super::{LoadingFlags, SelectionState, Surface};

/// What the user can do on the student registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentSignupAction {
    /// A text input changed.
    FieldChanged(FormField, String),
    /// A building was picked.
    BuildingChosen(BuildingId),
    /// A course was picked.
    CourseChosen(CourseId),
    /// A group was picked.
    GroupChosen(GroupId),
    /// Ask for the building list again.
    RetryBuildings,
    /// The form was submitted.
    Submit,
    /// Go to sign-in.
    SwitchToLogin,
}

/// Rendered student registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSignupView {
    /// Building dropdown.
    pub buildings: SelectorView,
    /// Course dropdown.
    pub courses: SelectorView,
    /// Group dropdown.
    pub groups: SelectorView,
    /// Whether the submit button accepts clicks.
    pub submit_enabled: bool,
    /// Inline field errors.
    pub field_errors: Vec<(FormField, String)>,
    /// Result or degraded-mode banner; results take precedence.
    pub banner: Option<Banner>,
}

/// Student registration surface state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentSignupSurface {
    form: RawForm,
    selection: SelectionState,
    loading: LoadingFlags,
    submission: SubmissionState,
}

impl StudentSignupSurface {
    /// Building/course/group state.
    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }
}

impl Surface for StudentSignupSurface {
    type Action = StudentSignupAction;
    type View = StudentSignupView;

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::StudentSignup
    }

    fn on_mount(&mut self) -> Vec<InboundMessage> {
        vec![InboundMessage::LoadBuildingsRequest]
    }

    fn dispatch(&mut self, action: StudentSignupAction) -> Vec<InboundMessage> {
        match action {
            StudentSignupAction::FieldChanged(field, value) => {
                set_text_field(&mut self.form, field, value);
                Vec::new()
            }
            StudentSignupAction::BuildingChosen(building_id) => {
                vec![self.selection.select_building(building_id)]
            }
            StudentSignupAction::CourseChosen(course_id) => {
                self.selection.select_course(course_id).into_iter().collect()
            }
            StudentSignupAction::GroupChosen(group_id) => {
                self.selection.select_group(group_id).into_iter().collect()
            }
            StudentSignupAction::RetryBuildings => vec![InboundMessage::LoadBuildingsRequest],
            StudentSignupAction::Submit => {
                if !self.submission.begin() {
                    return Vec::new();
                }
                let chosen = self.selection.selection();
                vec![InboundMessage::StudentSignupFormSubmit(RawForm {
                    building_id: chosen.building(),
                    course_id: chosen.course(),
                    group_id: chosen.group(),
                    invite_code: String::new(),
                    ..self.form.clone()
                })]
            }
            StudentSignupAction::SwitchToLogin => vec![InboundMessage::SwitchToLogin],
        }
    }

    fn receive(&mut self, message: &OutboundMessage) {
        self.loading.receive(message);
        self.selection.receive(message);
        self.submission.receive(message);
    }

    fn render(&self) -> StudentSignupView {
        StudentSignupView {
            buildings: self.selection.building_selector(&self.loading),
            courses: self.selection.course_selector(&self.loading),
            groups: self.selection.group_selector(&self.loading),
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
