//! Row and auth payload DTOs for the REST backend.
//!
//! Rows use the store's snake_case column names and convert into domain
//! records in one pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    AuthIdentity, Building, BuildingId, Course, CourseId, Group, GroupId, IdentityMetadata,
    InviteCode, Profile, StudentProfile, TeacherProfile, TestId, TestSummary, UserId,
};

#[derive(Debug, Deserialize)]
pub(super) struct BuildingRow {
    id: i64,
    name: String,
}

impl BuildingRow {
    pub(super) fn into_domain(self) -> Building {
        Building::new(BuildingId::new(self.id), self.name)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CourseRow {
    id: i64,
    building_id: i64,
    course_number: u8,
}

impl CourseRow {
    pub(super) fn into_domain(self) -> Course {
        Course {
            id: CourseId::new(self.id),
            building_id: BuildingId::new(self.building_id),
            course_number: self.course_number,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GroupRow {
    id: i64,
    course_id: i64,
    group_number: u16,
}

impl GroupRow {
    pub(super) fn into_domain(self) -> Group {
        Group {
            id: GroupId::new(self.id),
            course_id: CourseId::new(self.course_id),
            group_number: self.group_number,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TestRow {
    id: i64,
    title: String,
    question_count: u16,
}

impl TestRow {
    pub(super) fn into_domain(self) -> TestSummary {
        TestSummary {
            id: TestId::new(self.id),
            title: self.title,
            question_count: self.question_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct InviteRow {
    code: String,
    is_used: bool,
    expires_at: Option<DateTime<Utc>>,
    used_by: Option<Uuid>,
    used_at: Option<DateTime<Utc>>,
}

impl InviteRow {
    pub(super) fn into_domain(self) -> InviteCode {
        InviteCode {
            code: self.code,
            is_used: self.is_used,
            expires_at: self.expires_at,
            used_by: self.used_by.map(UserId::from_uuid),
            used_at: self.used_at,
        }
    }
}

/// Columns written when an invite is redeemed.
#[derive(Debug, Serialize)]
pub(super) struct InviteRedemption {
    pub(super) is_used: bool,
    pub(super) used_by: Uuid,
    pub(super) used_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct StudentRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    group_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct TeacherRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    building_id: Option<i64>,
}

impl StudentRow {
    pub(super) fn into_domain(self) -> Profile {
        Profile::Student(StudentProfile {
            user_id: UserId::from_uuid(self.id),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            group_id: GroupId::new(self.group_id),
        })
    }
}

impl TeacherRow {
    pub(super) fn into_domain(self) -> Profile {
        Profile::Teacher(TeacherProfile {
            user_id: UserId::from_uuid(self.id),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            building_id: self.building_id.map(BuildingId::new),
        })
    }
}

/// Table and row for a profile insert.
pub(super) enum ProfileRow {
    Student(StudentRow),
    Teacher(TeacherRow),
}

impl ProfileRow {
    pub(super) fn from_domain(profile: &Profile) -> Self {
        match profile {
            Profile::Student(student) => Self::Student(StudentRow {
                id: *student.user_id.as_uuid(),
                email: student.email.clone(),
                first_name: student.first_name.clone(),
                last_name: student.last_name.clone(),
                group_id: student.group_id.get(),
            }),
            Profile::Teacher(teacher) => Self::Teacher(TeacherRow {
                id: *teacher.user_id.as_uuid(),
                email: teacher.email.clone(),
                first_name: teacher.first_name.clone(),
                last_name: teacher.last_name.clone(),
                building_id: teacher.building_id.map(BuildingId::get),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordGrant<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SignUpBody<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) data: &'a IdentityMetadata,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

impl UserDto {
    /// Identity with `fallback_email` used when the provider omits it.
    ///
    /// Metadata that does not decode is treated as absent.
    pub(super) fn into_identity(self, fallback_email: &str) -> AuthIdentity {
        let metadata = self
            .user_metadata
            .and_then(|value| serde_json::from_value::<IdentityMetadata>(value).ok());
        AuthIdentity {
            user_id: UserId::from_uuid(self.id),
            email: self
                .email
                .map_or_else(|| fallback_email.to_owned(), |email| email.to_lowercase()),
            metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SessionDto {
    pub(super) access_token: String,
    pub(super) user: UserDto,
}

/// Signup answers with a session, or with the bare user when the email
/// must be confirmed first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponseDto {
    Session(SessionDto),
    User(UserDto),
}
