//! Controller behaviour against mocked ports.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::TimeDelta;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then};

use super::*;
use crate::domain::ports::{
    IdentityProviderError, MockAcademicDirectory, MockIdentityProvider,
    MockInviteCodeRepository, MockProfileRepository, MockTestCatalogue, ProfileRepositoryError,
    SignUpOutcome, TestCatalogueError,
};
use crate::domain::{
    AuthIdentity, Building, BuildingId, ErrorCode, FormField, GroupId, IdentityMetadata,
    InviteCode, RateLimitPolicy, RawForm, Role, StudentProfile, TestId, TestScope, TestSummary,
};
use crate::protocol::Resource;
use crate::test_support::{MutableClock, RecordingSink};

/// Mock ports, configured per test before the controller is built.
#[derive(Default)]
struct Backend {
    directory: MockAcademicDirectory,
    identity: MockIdentityProvider,
    invites: MockInviteCodeRepository,
    profiles: MockProfileRepository,
    tests: MockTestCatalogue,
}

impl Backend {
    fn controller(self) -> SessionController {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MutableClock::fixed());
        let limiter = Arc::new(AttemptLimiter::new(clock.clone(), RateLimitPolicy::default()));
        let ports = PortalPorts {
            directory: Arc::new(self.directory),
            identity: Arc::new(self.identity),
            invites: Arc::new(self.invites),
            profiles: Arc::new(self.profiles),
            tests: Arc::new(self.tests),
        };
        SessionController::new(ports, limiter, clock)
    }
}

#[fixture]
fn backend() -> Backend {
    Backend::default()
}

fn student_identity() -> AuthIdentity {
    AuthIdentity {
        user_id: UserId::random(),
        email: "ada@example.org".to_owned(),
        metadata: Some(IdentityMetadata {
            role: Role::Student,
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            group_id: Some(GroupId::new(7)),
            building_id: Some(BuildingId::new(1)),
        }),
    }
}

fn student_profile(identity: &AuthIdentity) -> Profile {
    Profile::Student(StudentProfile {
        user_id: identity.user_id,
        email: identity.email.clone(),
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        group_id: GroupId::new(7),
    })
}

fn student_form() -> RawForm {
    RawForm {
        email: "Ada@Example.org".to_owned(),
        password: "secret1".to_owned(),
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        building_id: Some(BuildingId::new(1)),
        group_id: Some(GroupId::new(7)),
        ..RawForm::default()
    }
}

fn teacher_form() -> RawForm {
    RawForm {
        email: "grace@example.org".to_owned(),
        password: "secret1".to_owned(),
        first_name: "Grace".to_owned(),
        last_name: "Hopper".to_owned(),
        invite_code: "TEACH-42".to_owned(),
        ..RawForm::default()
    }
}

fn login_form() -> RawForm {
    RawForm {
        email: "ada@example.org".to_owned(),
        password: "secret1".to_owned(),
        ..RawForm::default()
    }
}

fn auth_error(sink: &RecordingSink) -> (ErrorCode, String) {
    match sink.messages() {
        [OutboundMessage::AuthError { message, code }] => (*code, message.clone()),
        other => panic!("expected a single AUTH_ERROR, got {other:?}"),
    }
}

async fn signed_in(mut backend: Backend, identity: &AuthIdentity) -> SessionController {
    let session_identity = identity.clone();
    backend
        .identity
        .expect_sign_in_with_password()
        .times(1)
        .returning(move |_| Ok(AuthSession::new("token-1", session_identity.clone())));
    let mut controller = backend.controller();
    let mut sink = RecordingSink::default();
    controller
        .dispatch(InboundMessage::LoginFormSubmit(login_form()), &mut sink)
        .await
        .expect("login delivered");
    assert!(controller.is_signed_in());
    controller
}

#[given("a student signup whose password is five characters")]
fn a_student_signup_with_a_short_password() -> RawForm {
    RawForm {
        password: "abcde".to_owned(),
        ..student_form()
    }
}

async fn the_student_submits(backend: Backend, form: RawForm) -> (SessionController, RecordingSink) {
    let mut controller = backend.controller();
    let mut sink = RecordingSink::default();
    controller
        .dispatch(InboundMessage::StudentSignupFormSubmit(form), &mut sink)
        .await
        .expect("reply delivered");
    (controller, sink)
}

#[then("only the password error is returned")]
fn only_the_password_error_is_returned(sink: RecordingSink) {
    let [OutboundMessage::ValidationErrors { errors }] = sink.messages() else {
        panic!("expected VALIDATION_ERRORS, got {:?}", sink.messages());
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.get(FormField::Password),
        Some("Password must be at least 6 characters.")
    );
}

#[rstest]
#[tokio::test]
async fn short_password_never_reaches_the_identity_provider(mut backend: Backend) {
    backend.identity.expect_sign_up().never();
    let form = a_student_signup_with_a_short_password();
    let (controller, sink) = the_student_submits(backend, form).await;
    assert_eq!(controller.phase(), FlowPhase::Idle);
    assert!(!controller.is_signed_in());
    only_the_password_error_is_returned(sink);
}

#[rstest]
#[tokio::test]
async fn student_signup_without_session_asks_for_confirmation(mut backend: Backend) {
    let identity = student_identity();
    let created = identity.clone();
    backend
        .identity
        .expect_sign_up()
        .withf(|request| {
            request.credentials.email() == "ada@example.org"
                && request.metadata.group_id == Some(GroupId::new(7))
        })
        .times(1)
        .returning(move |_| {
            Ok(SignUpOutcome {
                identity: created.clone(),
                session: None,
            })
        });
    backend.profiles.expect_find_profile().returning(|_| Ok(None));
    backend.profiles.expect_insert_profile().times(1).returning(|_| Ok(()));

    let (controller, sink) = the_student_submits(backend, student_form()).await;

    assert_eq!(
        sink.messages(),
        [OutboundMessage::AuthSuccess {
            message: signup_confirm_message().to_owned()
        }]
    );
    assert!(!controller.is_signed_in());
    assert_eq!(controller.surface(), SurfaceKind::Login);
}

fn signup_confirm_message() -> &'static str {
    "Registration successful. Check your email to confirm your account, then sign in."
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_normalised(mut backend: Backend) {
    backend
        .identity
        .expect_sign_up()
        .returning(|_| Err(IdentityProviderError::already_registered()));

    let (_, sink) = the_student_submits(backend, student_form()).await;

    let (code, message) = auth_error(&sink);
    assert_eq!(code, ErrorCode::DuplicateIdentity);
    assert_eq!(
        message,
        "An account with this email already exists. Please sign in instead."
    );
}

#[rstest]
#[tokio::test]
async fn sixth_attempt_within_window_is_rate_limited(mut backend: Backend) {
    backend.identity.expect_sign_up().never();
    let mut controller = backend.controller();

    for _ in 0..5 {
        let mut sink = RecordingSink::default();
        controller
            .dispatch(
                InboundMessage::StudentSignupFormSubmit(a_student_signup_with_a_short_password()),
                &mut sink,
            )
            .await
            .expect("reply delivered");
        assert_eq!(sink.type_names(), ["VALIDATION_ERRORS"]);
    }

    let mut sink = RecordingSink::default();
    controller
        .dispatch(
            InboundMessage::StudentSignupFormSubmit(a_student_signup_with_a_short_password()),
            &mut sink,
        )
        .await
        .expect("reply delivered");
    let (code, message) = auth_error(&sink);
    assert_eq!(code, ErrorCode::RateLimited);
    assert_eq!(message, "Too many attempts. Please try again in 15 minute(s).");
    assert_eq!(controller.phase(), FlowPhase::Idle);
}

#[rstest]
#[case::wrong_password(
    IdentityProviderError::invalid_credentials(),
    ErrorCode::InvalidCredentials,
    "Invalid email or password."
)]
#[case::unconfirmed(
    IdentityProviderError::email_not_confirmed(),
    ErrorCode::EmailNotConfirmed,
    "Please confirm your email address before signing in."
)]
#[case::outage(
    IdentityProviderError::unavailable("connection reset"),
    ErrorCode::BackendUnavailable,
    "Sign in failed. Please try again later."
)]
#[tokio::test]
async fn sign_in_failures_are_distinguished(
    mut backend: Backend,
    #[case] failure: IdentityProviderError,
    #[case] expected_code: ErrorCode,
    #[case] expected_message: &str,
) {
    backend
        .identity
        .expect_sign_in_with_password()
        .times(1)
        .returning(move |_| Err(failure.clone()));
    let mut controller = backend.controller();
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::LoginFormSubmit(login_form()), &mut sink)
        .await
        .expect("reply delivered");

    assert_eq!(auth_error(&sink), (expected_code, expected_message.to_owned()));
    assert!(!controller.is_signed_in());
    assert_eq!(controller.phase(), FlowPhase::Idle);
}

#[rstest]
#[tokio::test]
async fn successful_sign_in_mounts_dashboard_and_publishes_state(mut backend: Backend) {
    let identity = student_identity();
    let stored = student_profile(&identity);
    let session_identity = identity.clone();
    backend
        .identity
        .expect_sign_in_with_password()
        .withf(|credentials| credentials.email() == "ada@example.org")
        .returning(move |_| Ok(AuthSession::new("token-1", session_identity.clone())));
    backend
        .profiles
        .expect_find_profile()
        .returning(move |_| Ok(Some(stored.clone())));
    let mut controller = backend.controller();
    let auth_state = controller.subscribe_auth_state();
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::LoginFormSubmit(login_form()), &mut sink)
        .await
        .expect("reply delivered");

    assert_eq!(sink.type_names(), ["AUTH_SUCCESS", "SURFACE_CHANGED"]);
    assert_eq!(controller.surface(), SurfaceKind::Dashboard);
    assert_eq!(*auth_state.borrow(), AuthState::SignedIn(identity.user_id));
}

#[rstest]
#[tokio::test]
async fn teacher_signup_losing_the_invite_race_reports_conflict(mut backend: Backend) {
    let identity = AuthIdentity {
        user_id: UserId::random(),
        email: "grace@example.org".to_owned(),
        metadata: None,
    };
    backend
        .profiles
        .expect_teacher_email_exists()
        .returning(|_| Ok(false));
    backend
        .invites
        .expect_find_redeemable()
        .withf(|code, _| code == "TEACH-42")
        .returning(|code, _| Ok(Some(InviteCode::new(code, None))));
    let created = identity.clone();
    backend.identity.expect_sign_up().times(1).returning(move |_| {
        Ok(SignUpOutcome {
            identity: created.clone(),
            session: None,
        })
    });
    backend.invites.expect_redeem().times(1).returning(|_, _, _| Ok(false));
    backend.profiles.expect_insert_profile().never();
    let mut controller = backend.controller();
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::TeacherSignupFormSubmit(teacher_form()), &mut sink)
        .await
        .expect("reply delivered");

    let (code, _) = auth_error(&sink);
    assert_eq!(code, ErrorCode::InviteCodeConflict);
    assert!(!controller.is_signed_in());
}

#[rstest]
#[tokio::test]
async fn invalid_invite_code_stops_before_account_creation(mut backend: Backend) {
    backend
        .profiles
        .expect_teacher_email_exists()
        .returning(|_| Ok(false));
    backend
        .invites
        .expect_find_redeemable()
        .returning(|_, _| Ok(None));
    backend.identity.expect_sign_up().never();
    let mut controller = backend.controller();
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::TeacherSignupFormSubmit(teacher_form()), &mut sink)
        .await
        .expect("reply delivered");

    assert_eq!(auth_error(&sink).0, ErrorCode::InviteCodeInvalid);
}

#[rstest]
#[tokio::test]
async fn existing_teacher_email_is_rejected(mut backend: Backend) {
    backend
        .profiles
        .expect_teacher_email_exists()
        .withf(|email| email == "grace@example.org")
        .returning(|_| Ok(true));
    backend.invites.expect_find_redeemable().never();
    backend.identity.expect_sign_up().never();
    let mut controller = backend.controller();
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::TeacherSignupFormSubmit(teacher_form()), &mut sink)
        .await
        .expect("reply delivered");

    assert_eq!(
        auth_error(&sink),
        (
            ErrorCode::DuplicateIdentity,
            "A teacher account with this email already exists.".to_owned()
        )
    );
}

#[rstest]
#[tokio::test]
async fn building_load_is_bracketed_by_loading_state(mut backend: Backend) {
    backend.directory.expect_list_buildings().returning(|| {
        Ok(vec![
            Building::new(BuildingId::new(2), "Main"),
            Building::new(BuildingId::new(1), "Annex"),
        ])
    });
    let mut controller = backend.controller();
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::LoadBuildingsRequest, &mut sink)
        .await
        .expect("reply delivered");

    assert_eq!(
        sink.type_names(),
        ["LOADING_STATE", "BUILDINGS_LOADED", "LOADING_STATE"]
    );
    let messages = sink.drain();
    assert_eq!(messages[0], OutboundMessage::loading(Resource::Buildings, true));
    assert_eq!(messages[2], OutboundMessage::loading(Resource::Buildings, false));
    let OutboundMessage::BuildingsLoaded { buildings } = &messages[1] else {
        panic!("expected BUILDINGS_LOADED");
    };
    let names: Vec<_> = buildings.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Annex", "Main"]);
}

#[rstest]
#[case::profile(InboundMessage::LoadProfileRequest)]
#[case::tests(InboundMessage::LoadTestsRequest)]
#[case::recreate(InboundMessage::RecreateProfileRequest)]
#[case::start(InboundMessage::StartTestRequest { test_id: TestId::new(1) })]
#[case::dashboard(InboundMessage::SwitchToDashboard)]
#[tokio::test]
async fn dashboard_actions_require_a_session(
    backend: Backend,
    #[case] message: InboundMessage,
) {
    let mut controller = backend.controller();
    let mut sink = RecordingSink::default();

    controller
        .dispatch(message, &mut sink)
        .await
        .expect("reply delivered");

    assert_eq!(
        sink.messages(),
        [OutboundMessage::ErrorState {
            message: NOT_SIGNED_IN.to_owned()
        }]
    );
    assert_eq!(controller.surface(), SurfaceKind::Login);
}

#[rstest]
#[tokio::test]
async fn missing_profile_is_reported_then_recreated(mut backend: Backend) {
    let identity = student_identity();
    let expected = student_profile(&identity);
    let current = identity.clone();
    backend
        .identity
        .expect_current_user()
        .withf(|token| token == "token-1")
        .times(1)
        .returning(move |_| Ok(current.clone()));
    backend.profiles.expect_find_profile().returning(|_| Ok(None));
    let inserts = Arc::new(AtomicUsize::new(0));
    backend.profiles.expect_insert_profile().times(2).returning({
        let inserts = Arc::clone(&inserts);
        move |_| {
            if inserts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ProfileRepositoryError::connection("down"))
            } else {
                Ok(())
            }
        }
    });
    let mut controller = signed_in(backend, &identity).await;
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::LoadProfileRequest, &mut sink)
        .await
        .expect("reply delivered");
    assert_eq!(
        sink.type_names(),
        ["LOADING_STATE", "PROFILE_NOT_FOUND", "LOADING_STATE"]
    );

    let mut sink = RecordingSink::default();
    controller
        .dispatch(InboundMessage::RecreateProfileRequest, &mut sink)
        .await
        .expect("reply delivered");
    assert_eq!(
        sink.messages(),
        [OutboundMessage::ProfileRecreated { profile: expected }]
    );
    assert_eq!(inserts.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test]
async fn tests_are_listed_for_the_student_group(mut backend: Backend) {
    let identity = student_identity();
    let stored = student_profile(&identity);
    backend
        .profiles
        .expect_find_profile()
        .returning(move |_| Ok(Some(stored.clone())));
    backend
        .tests
        .expect_list_tests()
        .withf(|scope| *scope == TestScope::Group(GroupId::new(7)))
        .returning(|_| {
            Ok(vec![TestSummary {
                id: TestId::new(3),
                title: "Kinematics".to_owned(),
                question_count: 12,
            }])
        });
    let mut controller = signed_in(backend, &identity).await;
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::LoadTestsRequest, &mut sink)
        .await
        .expect("reply delivered");
    controller
        .dispatch(InboundMessage::StartTestRequest { test_id: TestId::new(3) }, &mut sink)
        .await
        .expect("reply delivered");
    controller
        .dispatch(InboundMessage::StartTestRequest { test_id: TestId::new(99) }, &mut sink)
        .await
        .expect("reply delivered");

    assert_eq!(
        sink.type_names(),
        [
            "LOADING_STATE",
            "TESTS_LOADED",
            "LOADING_STATE",
            "SURFACE_CHANGED",
            "TEST_STARTED",
            "ERROR_STATE",
        ]
    );
    assert_eq!(controller.surface(), SurfaceKind::TestSession);
}

#[rstest]
#[tokio::test]
async fn test_listing_failure_becomes_load_error(mut backend: Backend) {
    let identity = student_identity();
    let stored = student_profile(&identity);
    backend
        .profiles
        .expect_find_profile()
        .returning(move |_| Ok(Some(stored.clone())));
    backend
        .tests
        .expect_list_tests()
        .returning(|_| Err(TestCatalogueError::query("relation \"tests\" is missing")));
    let mut controller = signed_in(backend, &identity).await;
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::LoadTestsRequest, &mut sink)
        .await
        .expect("reply delivered");

    assert_eq!(sink.type_names(), ["LOADING_STATE", "LOAD_ERROR", "LOADING_STATE"]);
}

#[rstest]
#[tokio::test]
async fn logout_clears_session_even_when_provider_fails(mut backend: Backend) {
    let identity = student_identity();
    backend.profiles.expect_find_profile().returning(|_| Ok(None));
    backend.profiles.expect_insert_profile().returning(|_| Ok(()));
    backend
        .identity
        .expect_sign_out()
        .withf(|token| token == "token-1")
        .times(1)
        .returning(|_| Err(IdentityProviderError::unavailable("timeout")));
    let mut controller = signed_in(backend, &identity).await;
    let auth_state = controller.subscribe_auth_state();
    let mut sink = RecordingSink::default();

    controller
        .dispatch(InboundMessage::LogoutRequest, &mut sink)
        .await
        .expect("reply delivered");

    assert!(!controller.is_signed_in());
    assert_eq!(*auth_state.borrow(), AuthState::SignedOut);
    assert_eq!(
        sink.messages(),
        [OutboundMessage::SurfaceChanged {
            surface: SurfaceKind::Login
        }]
    );
}

#[rstest]
#[tokio::test]
async fn rate_limit_window_expiry_allows_new_attempts() {
    let clock = Arc::new(MutableClock::fixed());
    let policy = RateLimitPolicy {
        window: TimeDelta::minutes(15),
        max_attempts: 1,
    };
    let limiter = Arc::new(AttemptLimiter::new(clock.clone(), policy));
    let ports = {
        let backend = Backend::default();
        PortalPorts {
            directory: Arc::new(backend.directory),
            identity: Arc::new(backend.identity),
            invites: Arc::new(backend.invites),
            profiles: Arc::new(backend.profiles),
            tests: Arc::new(backend.tests),
        }
    };
    let mut controller = SessionController::new(ports, limiter, clock.clone());
    let submit = || InboundMessage::StudentSignupFormSubmit(a_student_signup_with_a_short_password());

    let mut sink = RecordingSink::default();
    controller.dispatch(submit(), &mut sink).await.expect("delivered");
    controller.dispatch(submit(), &mut sink).await.expect("delivered");
    clock.advance(TimeDelta::minutes(16));
    controller.dispatch(submit(), &mut sink).await.expect("delivered");

    assert_eq!(
        sink.type_names(),
        ["VALIDATION_ERRORS", "AUTH_ERROR", "VALIDATION_ERRORS"]
    );
}
