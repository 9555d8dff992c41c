//! Role-tagged user profiles.
//!
//! A profile is either a student attached to a group or a teacher attached
//! (optionally) to a building. Every site that needs role-specific behaviour
//! matches on [`Profile`] exhaustively instead of probing optional fields.

use serde::{Deserialize, Serialize};

use crate::domain::academic::{BuildingId, GroupId, TestScope};
use crate::domain::auth::{AuthIdentity, Role, UserId};

/// Profile row of a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    /// Owning identity.
    pub user_id: UserId,
    /// Contact email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Group the student belongs to.
    pub group_id: GroupId,
}

/// Teacher record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    /// Owning identity.
    pub user_id: UserId,
    /// Contact email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Building the teacher works in, when chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<BuildingId>,
}

/// A portal profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    /// Student branch.
    Student(StudentProfile),
    /// Teacher branch.
    Teacher(TeacherProfile),
}

/// Reasons a profile cannot be derived from identity metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileDerivationError {
    /// The identity carries no signup metadata.
    #[error("identity has no signup metadata")]
    MissingMetadata,
    /// A student identity has no recorded group.
    #[error("student identity has no group selection")]
    MissingGroup,
    /// A teacher identity never redeemed an invite code.
    #[error("teacher identity holds no redeemed invite code")]
    InviteNotRedeemed,
}

impl Profile {
    /// Identity that owns the profile.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Student(student) => &student.user_id,
            Self::Teacher(teacher) => &teacher.user_id,
        }
    }

    /// Role of the profile.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Teacher(_) => Role::Teacher,
        }
    }

    /// Full name for greetings.
    #[must_use]
    pub fn display_name(&self) -> String {
        let (first, last) = match self {
            Self::Student(student) => (&student.first_name, &student.last_name),
            Self::Teacher(teacher) => (&teacher.first_name, &teacher.last_name),
        };
        format!("{first} {last}")
    }

    /// Tests visible to this profile, if any scope applies.
    #[must_use]
    pub fn test_scope(&self) -> Option<TestScope> {
        match self {
            Self::Student(student) => Some(TestScope::Group(student.group_id)),
            Self::Teacher(teacher) => teacher.building_id.map(TestScope::Building),
        }
    }

    /// Rebuild the profile an identity should have from its signup metadata.
    pub fn derive_from(identity: &AuthIdentity) -> Result<Self, ProfileDerivationError> {
        let metadata = identity
            .metadata
            .as_ref()
            .ok_or(ProfileDerivationError::MissingMetadata)?;
        match metadata.role {
            Role::Student => {
                let group_id = metadata
                    .group_id
                    .ok_or(ProfileDerivationError::MissingGroup)?;
                Ok(Self::Student(StudentProfile {
                    user_id: identity.user_id,
                    email: identity.email.clone(),
                    first_name: metadata.first_name.clone(),
                    last_name: metadata.last_name.clone(),
                    group_id,
                }))
            }
            Role::Teacher => Ok(Self::Teacher(TeacherProfile {
                user_id: identity.user_id,
                email: identity.email.clone(),
                first_name: metadata.first_name.clone(),
                last_name: metadata.last_name.clone(),
                building_id: metadata.building_id,
            })),
        }
    }
}
