//! Typed protocol messages.
//!
//! Inbound messages travel surface → controller, outbound messages travel
//! controller → surface. Both serialise to the same `{ type, data }` shape.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Building, BuildingId, Course, CourseId, ErrorCode, FieldErrors, Group, GroupId, Profile,
    RawForm, TestId, TestSummary,
};

/// Resources with a loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Building list.
    Buildings,
    /// Course list of the selected building.
    Courses,
    /// Group list of the selected course.
    Groups,
    /// Dashboard profile.
    Profile,
    /// Dashboard test list.
    Tests,
}

/// Surface documents the host can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceKind {
    /// Sign-in form.
    Login,
    /// Student registration form.
    StudentSignup,
    /// Teacher registration form.
    TeacherSignup,
    /// Profile and test list.
    Dashboard,
    /// A running test.
    TestSession,
}

/// Messages a surface sends to the controller.
///
/// Decoding goes through [`crate::protocol::decode_inbound`] so unknown types
/// and malformed payloads can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum InboundMessage {
    /// Fetch the building list.
    LoadBuildingsRequest,
    /// A building was chosen; resolve its courses.
    BuildingSelected {
        /// Chosen building.
        building_id: BuildingId,
    },
    /// A course was chosen; resolve its groups.
    CourseSelected {
        /// Chosen course.
        course_id: CourseId,
    },
    /// A group was chosen.
    GroupSelected {
        /// Chosen group.
        group_id: GroupId,
    },
    /// Check an invite code without redeeming it.
    ValidateInviteCode {
        /// Code as typed.
        code: String,
    },
    /// Student registration form.
    StudentSignupFormSubmit(RawForm),
    /// Teacher registration form.
    TeacherSignupFormSubmit(RawForm),
    /// Sign-in form.
    LoginFormSubmit(RawForm),
    /// Mount the sign-in surface.
    SwitchToLogin,
    /// Mount the student registration surface.
    SwitchToSignup,
    /// Mount the teacher registration surface.
    SwitchToTeacherSignup,
    /// Mount the dashboard surface.
    SwitchToDashboard,
    /// Fetch the signed-in user's profile.
    LoadProfileRequest,
    /// Fetch tests visible to the signed-in user.
    LoadTestsRequest,
    /// End the session.
    LogoutRequest,
    /// Rebuild a missing profile from signup metadata.
    RecreateProfileRequest,
    /// Open a test.
    StartTestRequest {
        /// Test to open.
        test_id: TestId,
    },
}

impl InboundMessage {
    /// Wire name of the message type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::LoadBuildingsRequest => "LOAD_BUILDINGS_REQUEST",
            Self::BuildingSelected { .. } => "BUILDING_SELECTED",
            Self::CourseSelected { .. } => "COURSE_SELECTED",
            Self::GroupSelected { .. } => "GROUP_SELECTED",
            Self::ValidateInviteCode { .. } => "VALIDATE_INVITE_CODE",
            Self::StudentSignupFormSubmit(_) => "STUDENT_SIGNUP_FORM_SUBMIT",
            Self::TeacherSignupFormSubmit(_) => "TEACHER_SIGNUP_FORM_SUBMIT",
            Self::LoginFormSubmit(_) => "LOGIN_FORM_SUBMIT",
            Self::SwitchToLogin => "SWITCH_TO_LOGIN",
            Self::SwitchToSignup => "SWITCH_TO_SIGNUP",
            Self::SwitchToTeacherSignup => "SWITCH_TO_TEACHER_SIGNUP",
            Self::SwitchToDashboard => "SWITCH_TO_DASHBOARD",
            Self::LoadProfileRequest => "LOAD_PROFILE_REQUEST",
            Self::LoadTestsRequest => "LOAD_TESTS_REQUEST",
            Self::LogoutRequest => "LOGOUT_REQUEST",
            Self::RecreateProfileRequest => "RECREATE_PROFILE_REQUEST",
            Self::StartTestRequest { .. } => "START_TEST_REQUEST",
        }
    }
}

/// Messages the controller sends to a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum OutboundMessage {
    /// Building list, ordered by name.
    BuildingsLoaded {
        /// Buildings to offer.
        buildings: Vec<Building>,
    },
    /// Visible courses of a building.
    CoursesLoaded {
        /// Building the list was resolved for.
        building_id: BuildingId,
        /// Courses to offer.
        courses: Vec<Course>,
    },
    /// Groups of a course.
    GroupsLoaded {
        /// Course the list was resolved for.
        course_id: CourseId,
        /// Groups to offer.
        groups: Vec<Group>,
    },
    /// Busy indicator toggle.
    LoadingState {
        /// Resource being loaded.
        resource: Resource,
        /// Whether a load is in flight.
        loading: bool,
    },
    /// A resource failed to load.
    LoadError {
        /// Resource that failed.
        resource: Resource,
        /// Backend message.
        message: String,
    },
    /// Outcome of an invite code check.
    InviteCodeValidationResult {
        /// Whether the code can be redeemed.
        valid: bool,
        /// Text for the user.
        message: String,
    },
    /// Field-level form errors.
    ValidationErrors {
        /// Message per failing field.
        errors: FieldErrors,
    },
    /// A sign-in or registration succeeded.
    AuthSuccess {
        /// Text for the user.
        message: String,
    },
    /// A sign-in or registration failed.
    AuthError {
        /// Text for the user.
        message: String,
        /// Failure category.
        code: ErrorCode,
    },
    /// Profile of the signed-in user.
    ProfileLoaded {
        /// The profile.
        profile: Profile,
    },
    /// The signed-in user has no profile row.
    ProfileNotFound {
        /// Text for the user.
        message: String,
    },
    /// Tests visible to the signed-in user.
    TestsLoaded {
        /// Visible tests.
        tests: Vec<TestSummary>,
    },
    /// A dashboard operation failed.
    ErrorState {
        /// Text for the user.
        message: String,
    },
    /// A missing profile was rebuilt.
    ProfileRecreated {
        /// The stored profile.
        profile: Profile,
    },
    /// A test was opened.
    TestStarted {
        /// The opened test.
        test: TestSummary,
    },
    /// The host should mount another surface.
    SurfaceChanged {
        /// Surface to mount.
        surface: SurfaceKind,
    },
}

impl OutboundMessage {
    /// Wire name of the message type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::BuildingsLoaded { .. } => "BUILDINGS_LOADED",
            Self::CoursesLoaded { .. } => "COURSES_LOADED",
            Self::GroupsLoaded { .. } => "GROUPS_LOADED",
            Self::LoadingState { .. } => "LOADING_STATE",
            Self::LoadError { .. } => "LOAD_ERROR",
            Self::InviteCodeValidationResult { .. } => "INVITE_CODE_VALIDATION_RESULT",
            Self::ValidationErrors { .. } => "VALIDATION_ERRORS",
            Self::AuthSuccess { .. } => "AUTH_SUCCESS",
            Self::AuthError { .. } => "AUTH_ERROR",
            Self::ProfileLoaded { .. } => "PROFILE_LOADED",
            Self::ProfileNotFound { .. } => "PROFILE_NOT_FOUND",
            Self::TestsLoaded { .. } => "TESTS_LOADED",
            Self::ErrorState { .. } => "ERROR_STATE",
            Self::ProfileRecreated { .. } => "PROFILE_RECREATED",
            Self::TestStarted { .. } => "TEST_STARTED",
            Self::SurfaceChanged { .. } => "SURFACE_CHANGED",
        }
    }

    /// Shorthand for a loading toggle.
    #[must_use]
    pub const fn loading(resource: Resource, loading: bool) -> Self {
        Self::LoadingState { resource, loading }
    }
}
