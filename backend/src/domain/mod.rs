//! Domain primitives, services and ports.
//!
//! Purpose: hold everything the session controller decides on, free of
//! transport details. Types document their invariants and serde contracts
//! in their own Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: normalised failures shown to users.
//! - Academic unit chain (Building, Course, Group) and the cascading resolver.
//! - Profile: tagged student/teacher record.
//! - Form validation, invite codes and the attempt limiter.
//! - SessionController: the host-side orchestrator.

pub mod academic;
pub mod auth;
pub mod cascade;
pub mod error;
pub mod form_validation;
pub mod invite;
pub mod ports;
pub mod profile;
pub mod rate_limiter;
pub mod session_controller;
pub mod trace_id;

pub use self::academic::{
    Building, BuildingId, Course, CourseId, Group, GroupId, TestId, TestScope, TestSummary,
};
pub use self::auth::{
    AuthIdentity, AuthSession, AuthState, Credentials, IdentityMetadata, Role, SignUpRequest,
    UserId,
};
pub use self::cascade::{
    CascadingResolver, CourseVisibilityPolicy, CourseVisibilityRule, ResolveError,
    SHORT_PROGRAM_MARKER, UnitSelection,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::form_validation::{
    FieldErrors, FormField, FormKind, LoginForm, PASSWORD_MIN_LEN, RawForm, StudentSignup,
    TeacherSignup, identity_key, sanitize, validate,
};
pub use self::invite::{INVITE_CODE_MIN_LEN, InviteCode};
pub use self::profile::{Profile, ProfileDerivationError, StudentProfile, TeacherProfile};
pub use self::rate_limiter::{AttemptLimiter, RateLimitPolicy, RateLimited};
pub use self::session_controller::{
    EnsureProfileError, FlowPhase, PortalPorts, SessionController, ensure_profile,
};
pub use self::trace_id::TraceId;
