//! Host-side session controller.
//!
//! One controller serves one bridge connection. It owns the authenticated
//! session, is the only component that calls backend ports, and answers
//! every inbound message with zero or more outbound messages posted through
//! a [`MessageSink`]. Messages are handled one at a time; the only
//! suspension points are backend awaits.
//!
//! Form submissions move through [`FlowPhase`]: `Idle → Validating →
//! Submitting → Succeeded | Failed → Idle`. Duplicate submissions are not
//! blocked here; the invite-code compare-and-set and email uniqueness at the
//! identity provider keep them harmless.

use std::sync::Arc;

use mockable::Clock;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::ports::{
    AcademicDirectory, IdentityProvider, InviteCodeRepository, MessageSink, MessageSinkError,
    ProfileRepository, TestCatalogue,
};
use crate::domain::{
    AttemptLimiter, AuthSession, AuthState, CascadingResolver, CourseVisibilityPolicy, Profile,
    UnitSelection, UserId,
};
use crate::protocol::{InboundMessage, OutboundMessage, SurfaceKind};

mod catalogue;
mod dashboard;
mod ensure_profile;
mod signup;

pub use ensure_profile::{EnsureProfileError, ensure_profile};

const NOT_SIGNED_IN: &str = "You are not signed in.";

/// Backend collaborators shared by every controller in the process.
#[derive(Clone)]
pub struct PortalPorts {
    /// Buildings, courses and groups.
    pub directory: Arc<dyn AcademicDirectory>,
    /// Account creation and authentication.
    pub identity: Arc<dyn IdentityProvider>,
    /// Invite codes.
    pub invites: Arc<dyn InviteCodeRepository>,
    /// Student profiles and teacher records.
    pub profiles: Arc<dyn ProfileRepository>,
    /// Dashboard tests.
    pub tests: Arc<dyn TestCatalogue>,
}

/// Phase of the current form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// No submission in progress.
    Idle,
    /// Rate limiting and field validation.
    Validating,
    /// Backend calls in flight.
    Submitting,
    /// The submission succeeded.
    Succeeded,
    /// The submission failed.
    Failed,
}

/// Session controller for one connection.
pub struct SessionController {
    ports: PortalPorts,
    resolver: CascadingResolver,
    limiter: Arc<AttemptLimiter>,
    clock: Arc<dyn Clock + Send + Sync>,
    session: Option<AuthSession>,
    profile: Option<Profile>,
    selection: UnitSelection,
    surface: SurfaceKind,
    phase: FlowPhase,
    auth_state: watch::Sender<AuthState>,
}

impl SessionController {
    /// Controller with the default course visibility rules, showing the
    /// sign-in surface.
    pub fn new(
        ports: PortalPorts,
        limiter: Arc<AttemptLimiter>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let resolver = CascadingResolver::new(
            ports.directory.clone(),
            CourseVisibilityPolicy::default(),
        );
        let (auth_state, _) = watch::channel(AuthState::SignedOut);
        Self {
            ports,
            resolver,
            limiter,
            clock,
            session: None,
            profile: None,
            selection: UnitSelection::default(),
            surface: SurfaceKind::Login,
            phase: FlowPhase::Idle,
            auth_state,
        }
    }

    /// Replace the course visibility rules.
    #[must_use]
    pub fn with_visibility_policy(mut self, policy: CourseVisibilityPolicy) -> Self {
        self.resolver = CascadingResolver::new(self.ports.directory.clone(), policy);
        self
    }

    /// Surface currently mounted.
    #[must_use]
    pub fn surface(&self) -> SurfaceKind {
        self.surface
    }

    /// Submission phase; `Idle` between messages.
    #[must_use]
    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Academic units selected so far.
    #[must_use]
    pub fn selection(&self) -> UnitSelection {
        self.selection
    }

    /// Whether a session is held.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Observe sign-in and sign-out transitions.
    pub fn subscribe_auth_state(&self) -> watch::Receiver<AuthState> {
        self.auth_state.subscribe()
    }

    /// Handle one inbound message.
    ///
    /// # Errors
    /// Returns the sink error when an outbound message cannot be delivered;
    /// the connection should then be closed.
    pub async fn dispatch(
        &mut self,
        message: InboundMessage,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        debug!(message_type = message.type_name(), "handling inbound message");
        match message {
            InboundMessage::LoadBuildingsRequest => self.load_buildings(sink).await,
            InboundMessage::BuildingSelected { building_id } => {
                self.building_selected(building_id, sink).await
            }
            InboundMessage::CourseSelected { course_id } => {
                self.course_selected(course_id, sink).await
            }
            InboundMessage::GroupSelected { group_id } => {
                self.group_selected(group_id);
                Ok(())
            }
            InboundMessage::ValidateInviteCode { code } => {
                self.validate_invite_code(&code, sink).await
            }
            InboundMessage::StudentSignupFormSubmit(form) => {
                self.submit_student_signup(&form, sink).await
            }
            InboundMessage::TeacherSignupFormSubmit(form) => {
                self.submit_teacher_signup(&form, sink).await
            }
            InboundMessage::LoginFormSubmit(form) => self.submit_login(&form, sink).await,
            InboundMessage::SwitchToLogin => self.mount(SurfaceKind::Login, sink).await,
            InboundMessage::SwitchToSignup => self.mount(SurfaceKind::StudentSignup, sink).await,
            InboundMessage::SwitchToTeacherSignup => {
                self.mount(SurfaceKind::TeacherSignup, sink).await
            }
            InboundMessage::SwitchToDashboard => self.switch_to_dashboard(sink).await,
            InboundMessage::LoadProfileRequest => self.load_profile(sink).await,
            InboundMessage::LoadTestsRequest => self.load_tests(sink).await,
            InboundMessage::LogoutRequest => self.logout(sink).await,
            InboundMessage::RecreateProfileRequest => self.recreate_profile(sink).await,
            InboundMessage::StartTestRequest { test_id } => self.start_test(test_id, sink).await,
        }
    }

    async fn mount(
        &mut self,
        surface: SurfaceKind,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        debug!(from = ?self.surface, to = ?surface, "mounting surface");
        self.surface = surface;
        sink.post(OutboundMessage::SurfaceChanged { surface }).await
    }

    async fn switch_to_dashboard(
        &mut self,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        if self.session.is_none() {
            return reject_unauthenticated(sink).await;
        }
        self.mount(SurfaceKind::Dashboard, sink).await
    }

    fn enter(&mut self, phase: FlowPhase) {
        debug!(from = ?self.phase, to = ?phase, "flow phase");
        self.phase = phase;
    }

    fn signed_in_user(&self) -> Option<UserId> {
        self.session
            .as_ref()
            .map(|session| session.identity().user_id)
    }

    fn start_session(&mut self, session: AuthSession) {
        let user_id = session.identity().user_id;
        info!(user_id = %user_id, "session started");
        self.session = Some(session);
        self.profile = None;
        self.auth_state.send_replace(AuthState::SignedIn(user_id));
    }

    fn end_session(&mut self) -> Option<AuthSession> {
        let session = self.session.take();
        if let Some(ended) = &session {
            info!(user_id = %ended.identity().user_id, "session ended");
        }
        self.profile = None;
        self.selection.clear();
        self.auth_state.send_replace(AuthState::SignedOut);
        session
    }
}

async fn reject_unauthenticated(sink: &mut dyn MessageSink) -> Result<(), MessageSinkError> {
    sink.post(OutboundMessage::ErrorState {
        message: NOT_SIGNED_IN.to_owned(),
    })
    .await
}

#[cfg(test)]
mod tests;
