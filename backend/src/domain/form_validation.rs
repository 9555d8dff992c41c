//! Form sanitisation and validation.
//!
//! Everything here is synchronous and side-effect free: the controller runs
//! these checks before any backend call, so a rejected form never costs a
//! round trip. Field errors are keyed by the wire name of the field so the
//! surface can place each message next to its input.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::academic::{BuildingId, CourseId, GroupId};
use crate::domain::auth::Credentials;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Characters removed from every string field before validation.
const STRIPPED_CHARS: [char; 5] = ['<', '>', '"', '\'', '&'];

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// The pattern is a constant; a unit test compiles it.
fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Form being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// Student registration.
    StudentSignup,
    /// Teacher registration with an invite code.
    TeacherSignup,
    /// Email/password sign-in.
    Login,
}

impl FormKind {
    const fn is_signup(self) -> bool {
        matches!(self, Self::StudentSignup | Self::TeacherSignup)
    }
}

/// Field names used as error-map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    /// Email input.
    Email,
    /// Password input.
    Password,
    /// Given name input.
    FirstName,
    /// Family name input.
    LastName,
    /// Group selector.
    Group,
    /// Invite code input.
    InviteCode,
}

/// Field-keyed validation messages. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    /// True when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for one field, if it failed.
    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Record a failure; the first message per field wins.
    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Iterate failures in field order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Raw form fields as submitted by a surface.
///
/// Missing fields deserialise as empty so validation can report them.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawForm {
    /// Email input.
    pub email: String,
    /// Password input.
    pub password: String,
    /// Given name input.
    pub first_name: String,
    /// Family name input.
    pub last_name: String,
    /// Invite code input.
    pub invite_code: String,
    /// Selected building.
    pub building_id: Option<BuildingId>,
    /// Selected course.
    pub course_id: Option<CourseId>,
    /// Selected group.
    pub group_id: Option<GroupId>,
}

impl fmt::Debug for RawForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("invite_code", &self.invite_code)
            .field("building_id", &self.building_id)
            .field("course_id", &self.course_id)
            .field("group_id", &self.group_id)
            .finish()
    }
}

impl RawForm {
    /// Copy of the form with every string field sanitized and the email
    /// lowercased.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            email: identity_key(&self.email),
            password: sanitize(&self.password),
            first_name: sanitize(&self.first_name),
            last_name: sanitize(&self.last_name),
            invite_code: sanitize(&self.invite_code),
            building_id: self.building_id,
            course_id: self.course_id,
            group_id: self.group_id,
        }
    }
}

/// Strip markup-significant characters and surrounding whitespace.
///
/// # Examples
/// ```
/// use portal::domain::sanitize;
///
/// assert_eq!(sanitize("  <b>Ada</b> "), "bAda/b");
/// ```
#[must_use]
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !STRIPPED_CHARS.contains(ch))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Rate-limit and uniqueness key for an email: sanitized and lowercased.
#[must_use]
pub fn identity_key(email: &str) -> String {
    sanitize(email).to_lowercase()
}

/// Validate a form of the given kind.
///
/// The input is sanitized first; an empty map means the form is valid.
#[must_use]
pub fn validate(kind: FormKind, form: &RawForm) -> FieldErrors {
    let form = form.sanitized();
    let mut errors = FieldErrors::default();

    if form.email.is_empty() {
        errors.insert(FormField::Email, "Email is required.");
    } else if !email_regex().is_match(&form.email) {
        errors.insert(FormField::Email, "Enter a valid email address.");
    }

    if form.password.is_empty() {
        errors.insert(FormField::Password, "Password is required.");
    } else if form.password.chars().count() < PASSWORD_MIN_LEN {
        errors.insert(
            FormField::Password,
            format!("Password must be at least {PASSWORD_MIN_LEN} characters."),
        );
    }

    if kind.is_signup() {
        if form.first_name.is_empty() {
            errors.insert(FormField::FirstName, "First name is required.");
        }
        if form.last_name.is_empty() {
            errors.insert(FormField::LastName, "Last name is required.");
        }
    }

    match kind {
        FormKind::StudentSignup if form.group_id.is_none() => {
            errors.insert(FormField::Group, "Select your group.");
        }
        FormKind::TeacherSignup if form.invite_code.is_empty() => {
            errors.insert(FormField::InviteCode, "Invite code is required.");
        }
        FormKind::StudentSignup | FormKind::TeacherSignup | FormKind::Login => {}
    }

    errors
}

/// Validated student registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSignup {
    /// Account credentials.
    pub credentials: Credentials,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Resolved group selection.
    pub group_id: GroupId,
    /// Building the group was picked from.
    pub building_id: Option<BuildingId>,
}

/// Validated teacher registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherSignup {
    /// Account credentials.
    pub credentials: Credentials,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Invite code to redeem.
    pub invite_code: String,
    /// Optional building selection.
    pub building_id: Option<BuildingId>,
}

/// Validated sign-in form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Credentials to authenticate.
    pub credentials: Credentials,
}

fn checked(kind: FormKind, form: &RawForm) -> Result<RawForm, FieldErrors> {
    let errors = validate(kind, form);
    if errors.is_empty() {
        Ok(form.sanitized())
    } else {
        Err(errors)
    }
}

impl StudentSignup {
    /// Sanitize and validate raw fields into a student registration.
    pub fn parse(form: &RawForm) -> Result<Self, FieldErrors> {
        let form = checked(FormKind::StudentSignup, form)?;
        let Some(group_id) = form.group_id else {
            let mut errors = FieldErrors::default();
            errors.insert(FormField::Group, "Select your group.");
            return Err(errors);
        };
        Ok(Self {
            credentials: Credentials::new(form.email, form.password),
            first_name: form.first_name,
            last_name: form.last_name,
            group_id,
            building_id: form.building_id,
        })
    }
}

impl TeacherSignup {
    /// Sanitize and validate raw fields into a teacher registration.
    pub fn parse(form: &RawForm) -> Result<Self, FieldErrors> {
        let form = checked(FormKind::TeacherSignup, form)?;
        Ok(Self {
            credentials: Credentials::new(form.email, form.password),
            first_name: form.first_name,
            last_name: form.last_name,
            invite_code: form.invite_code,
            building_id: form.building_id,
        })
    }
}

impl LoginForm {
    /// Sanitize and validate raw fields into sign-in credentials.
    pub fn parse(form: &RawForm) -> Result<Self, FieldErrors> {
        let form = checked(FormKind::Login, form)?;
        Ok(Self {
            credentials: Credentials::new(form.email, form.password),
        })
    }
}

#[cfg(test)]
#[path = "form_validation_tests.rs"]
mod tests;
