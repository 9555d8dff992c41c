//! Presentation surfaces.
//!
//! A surface is the sandboxed side of the bridge: it owns transient UI and
//! selection state, never touches the backend, and talks to the controller
//! only through protocol messages. All five surfaces share one reducer
//! shape, captured by [`Surface`]: named actions and controller messages
//! mutate a flat state struct, and [`Surface::render`] derives the view
//! model from it afterwards.
//!
//! The crate uses these reducers to drive the bridge from tests and to
//! document exactly what each surface sends and expects.

use std::collections::HashSet;

use crate::protocol::{InboundMessage, OutboundMessage, Resource, SurfaceKind};

mod dashboard;
mod login;
mod selection;
mod student_signup;
mod submission;
mod teacher_signup;
mod test_session;
pub mod view;

pub use dashboard::{DashboardAction, DashboardSurface, DashboardView, RolePanel};
pub use login::{LoginAction, LoginSurface, LoginView};
pub use selection::{SelectionState, fallback_buildings};
pub use student_signup::{StudentSignupAction, StudentSignupSurface, StudentSignupView};
pub use submission::SubmissionState;
pub use teacher_signup::{
    InviteCodeStatus, TeacherSignupAction, TeacherSignupSurface, TeacherSignupView,
};
pub use test_session::{TestSessionAction, TestSessionSurface, TestSessionView};

/// Shared reducer shape of every surface.
pub trait Surface {
    /// User interactions the surface handles.
    type Action;
    /// Render model produced after each mutation.
    type View;

    /// Which document this surface is.
    fn kind(&self) -> SurfaceKind;

    /// Requests sent once when the surface is mounted.
    fn on_mount(&mut self) -> Vec<InboundMessage>;

    /// Apply a user action; returns the requests it triggers.
    fn dispatch(&mut self, action: Self::Action) -> Vec<InboundMessage>;

    /// Apply a controller message. Messages a surface does not use are
    /// ignored.
    fn receive(&mut self, message: &OutboundMessage);

    /// Current view model.
    fn render(&self) -> Self::View;
}

/// Per-resource loading flags, written only from `LOADING_STATE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingFlags(HashSet<Resource>);

impl LoadingFlags {
    /// Whether a load for the resource is in flight.
    #[must_use]
    pub fn is_loading(&self, resource: Resource) -> bool {
        self.0.contains(&resource)
    }

    /// Apply a `LOADING_STATE` notification; other messages are ignored.
    pub fn receive(&mut self, message: &OutboundMessage) {
        if let OutboundMessage::LoadingState { resource, loading } = message {
            if *loading {
                self.0.insert(*resource);
            } else {
                self.0.remove(resource);
            }
        }
    }
}

/// The surface currently shown by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum MountedSurface {
    /// Sign-in form.
    Login(LoginSurface),
    /// Student registration.
    StudentSignup(StudentSignupSurface),
    /// Teacher registration.
    TeacherSignup(TeacherSignupSurface),
    /// Profile and tests.
    Dashboard(DashboardSurface),
    /// A running test.
    TestSession(TestSessionSurface),
}

impl MountedSurface {
    /// Fresh surface of the given kind.
    #[must_use]
    pub fn new(kind: SurfaceKind) -> Self {
        match kind {
            SurfaceKind::Login => Self::Login(LoginSurface::default()),
            SurfaceKind::StudentSignup => Self::StudentSignup(StudentSignupSurface::default()),
            SurfaceKind::TeacherSignup => Self::TeacherSignup(TeacherSignupSurface::default()),
            SurfaceKind::Dashboard => Self::Dashboard(DashboardSurface::default()),
            SurfaceKind::TestSession => Self::TestSession(TestSessionSurface::default()),
        }
    }

    /// Kind of the mounted surface.
    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Self::Login(surface) => surface.kind(),
            Self::StudentSignup(surface) => surface.kind(),
            Self::TeacherSignup(surface) => surface.kind(),
            Self::Dashboard(surface) => surface.kind(),
            Self::TestSession(surface) => surface.kind(),
        }
    }

    /// Mount-time requests of the current surface.
    pub fn on_mount(&mut self) -> Vec<InboundMessage> {
        match self {
            Self::Login(surface) => surface.on_mount(),
            Self::StudentSignup(surface) => surface.on_mount(),
            Self::TeacherSignup(surface) => surface.on_mount(),
            Self::Dashboard(surface) => surface.on_mount(),
            Self::TestSession(surface) => surface.on_mount(),
        }
    }

    /// Route a controller message.
    ///
    /// `SURFACE_CHANGED` replaces the mounted surface with a fresh one of
    /// the new kind and returns its mount-time requests; every other
    /// message goes to the current surface.
    pub fn receive(&mut self, message: &OutboundMessage) -> Vec<InboundMessage> {
        if let OutboundMessage::SurfaceChanged { surface } = message {
            *self = Self::new(*surface);
            return self.on_mount();
        }
        match self {
            Self::Login(surface) => surface.receive(message),
            Self::StudentSignup(surface) => surface.receive(message),
            Self::TeacherSignup(surface) => surface.receive(message),
            Self::Dashboard(surface) => surface.receive(message),
            Self::TestSession(surface) => surface.receive(message),
        }
        Vec::new()
    }
}

impl Default for MountedSurface {
    fn default() -> Self {
        Self::new(SurfaceKind::Login)
    }
}

#[cfg(test)]
mod tests {
    //! Routing between mounted surfaces.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SurfaceKind::Login, Vec::new())]
    #[case(SurfaceKind::StudentSignup, vec![InboundMessage::LoadBuildingsRequest])]
    #[case(SurfaceKind::TeacherSignup, vec![InboundMessage::LoadBuildingsRequest])]
    #[case(
        SurfaceKind::Dashboard,
        vec![InboundMessage::LoadProfileRequest, InboundMessage::LoadTestsRequest]
    )]
    #[case(SurfaceKind::TestSession, Vec::new())]
    fn surface_change_remounts_and_requests_initial_data(
        #[case] kind: SurfaceKind,
        #[case] expected: Vec<InboundMessage>,
    ) {
        let mut mounted = MountedSurface::default();
        let requests = mounted.receive(&OutboundMessage::SurfaceChanged { surface: kind });
        assert_eq!(mounted.kind(), kind);
        assert_eq!(requests, expected);
    }

    #[rstest]
    fn loading_flags_follow_notifications() {
        let mut flags = LoadingFlags::default();
        flags.receive(&OutboundMessage::loading(Resource::Courses, true));
        assert!(flags.is_loading(Resource::Courses));
        assert!(!flags.is_loading(Resource::Groups));
        flags.receive(&OutboundMessage::loading(Resource::Courses, false));
        assert!(!flags.is_loading(Resource::Courses));
    }
}
