//! Dashboard surface: profile summary and the test list.

use crate::domain::{BuildingId, GroupId, Profile, TestId, TestSummary};
use crate::protocol::{InboundMessage, OutboundMessage, Resource, SurfaceKind};

use super::view::Banner;
use super::{LoadingFlags, Surface};

/// What the user can do on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    /// Reload profile and tests.
    Refresh,
    /// Rebuild a missing profile from the account details.
    RecreateProfile,
    /// Open a test.
    StartTest(TestId),
    /// Sign out.
    Logout,
}

/// Role-specific part of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePanel {
    /// Students see their group.
    Student {
        /// The student's group.
        group_id: GroupId,
    },
    /// Teachers see their building, when one was chosen.
    Teacher {
        /// The teacher's building.
        building_id: Option<BuildingId>,
    },
}

impl RolePanel {
    fn for_profile(profile: &Profile) -> Self {
        match profile {
            Profile::Student(student) => Self::Student {
                group_id: student.group_id,
            },
            Profile::Teacher(teacher) => Self::Teacher {
                building_id: teacher.building_id,
            },
        }
    }
}

/// Rendered dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// Name to greet, once the profile is known.
    pub greeting: Option<String>,
    /// Role branch, once the profile is known.
    pub role_panel: Option<RolePanel>,
    /// Whether the profile is being fetched.
    pub profile_loading: bool,
    /// Whether the recreate-profile action is offered.
    pub can_recreate_profile: bool,
    /// Tests visible to the user.
    pub tests: Vec<TestSummary>,
    /// Whether the tests are being fetched.
    pub tests_loading: bool,
    /// Error or notice banner.
    pub banner: Option<Banner>,
}

/// Dashboard surface state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSurface {
    profile: Option<Profile>,
    missing_profile: Option<String>,
    tests: Vec<TestSummary>,
    loading: LoadingFlags,
    error: Option<String>,
}

impl Surface for DashboardSurface {
    type Action = DashboardAction;
    type View = DashboardView;

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Dashboard
    }

    fn on_mount(&mut self) -> Vec<InboundMessage> {
        vec![
            InboundMessage::LoadProfileRequest,
            InboundMessage::LoadTestsRequest,
        ]
    }

    fn dispatch(&mut self, action: DashboardAction) -> Vec<InboundMessage> {
        match action {
            DashboardAction::Refresh => {
                self.error = None;
                self.on_mount()
            }
            DashboardAction::RecreateProfile => {
                self.error = None;
                vec![
                    InboundMessage::RecreateProfileRequest,
                    InboundMessage::LoadTestsRequest,
                ]
            }
            DashboardAction::StartTest(test_id) => {
                vec![InboundMessage::StartTestRequest { test_id }]
            }
            DashboardAction::Logout => vec![InboundMessage::LogoutRequest],
        }
    }

    fn receive(&mut self, message: &OutboundMessage) {
        self.loading.receive(message);
        match message {
            OutboundMessage::ProfileLoaded { profile }
            | OutboundMessage::ProfileRecreated { profile } => {
                self.profile = Some(profile.clone());
                self.missing_profile = None;
            }
            OutboundMessage::ProfileNotFound { message } => {
                self.profile = None;
                self.missing_profile = Some(message.clone());
            }
            OutboundMessage::TestsLoaded { tests } => self.tests = tests.clone(),
            OutboundMessage::ErrorState { message }
            | OutboundMessage::LoadError {
                resource: Resource::Tests | Resource::Profile,
                message,
            } => self.error = Some(message.clone()),
            _ => {}
        }
    }

    fn render(&self) -> DashboardView {
        let banner = match (&self.error, &self.missing_profile) {
            (Some(error), _) => Some(Banner::error(error.clone())),
            (None, Some(missing)) => Some(Banner::warning(missing.clone())),
            (None, None) => None,
        };
        DashboardView {
            greeting: self.profile.as_ref().map(Profile::display_name),
            role_panel: self.profile.as_ref().map(RolePanel::for_profile),
            profile_loading: self.loading.is_loading(Resource::Profile),
            can_recreate_profile: self.missing_profile.is_some(),
            tests: self.tests.clone(),
            tests_loading: self.loading.is_loading(Resource::Tests),
            banner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StudentProfile, TeacherProfile, UserId};
    use rstest::rstest;

    fn student() -> Profile {
        Profile::Student(StudentProfile {
            user_id: UserId::random(),
            email: "ada@example.org".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            group_id: GroupId::new(7),
        })
    }

    fn teacher() -> Profile {
        Profile::Teacher(TeacherProfile {
            user_id: UserId::random(),
            email: "grace@example.org".to_owned(),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
            building_id: None,
        })
    }

    #[rstest]
    #[case::student(student(), RolePanel::Student { group_id: GroupId::new(7) })]
    #[case::teacher(teacher(), RolePanel::Teacher { building_id: None })]
    fn profile_selects_the_role_branch(#[case] profile: Profile, #[case] expected: RolePanel) {
        let mut surface = DashboardSurface::default();
        surface.receive(&OutboundMessage::ProfileLoaded { profile });
        assert_eq!(surface.render().role_panel, Some(expected));
    }

    #[rstest]
    fn missing_profile_offers_recreation() {
        let mut surface = DashboardSurface::default();
        surface.receive(&OutboundMessage::ProfileNotFound {
            message: "Profile not found.".to_owned(),
        });
        let view = surface.render();
        assert!(view.can_recreate_profile);
        assert_eq!(view.banner, Some(Banner::warning("Profile not found.")));

        let sent = surface.dispatch(DashboardAction::RecreateProfile);
        assert_eq!(sent[0], InboundMessage::RecreateProfileRequest);

        surface.receive(&OutboundMessage::ProfileRecreated { profile: student() });
        let view = surface.render();
        assert!(!view.can_recreate_profile);
        assert_eq!(view.greeting.as_deref(), Some("Ada Lovelace"));
    }
}
