//! Academic unit chain: buildings, courses and groups.
//!
//! A course belongs to exactly one building and a group to exactly one
//! course. Identifiers are opaque integers assigned by the table store and
//! serialise transparently so they can travel inside protocol payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_unit_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw store identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_unit_id!(
    /// Identifier of a building row.
    BuildingId
);
define_unit_id!(
    /// Identifier of a course row.
    CourseId
);
define_unit_id!(
    /// Identifier of a group row.
    GroupId
);
define_unit_id!(
    /// Identifier of a test row.
    TestId
);

/// A campus building; the root of the academic unit chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Store identifier.
    pub id: BuildingId,
    /// Display name; also the key for course visibility rules.
    pub name: String,
}

impl Building {
    /// Build a building record.
    pub fn new(id: BuildingId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A study year offered inside a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Store identifier.
    pub id: CourseId,
    /// Owning building.
    pub building_id: BuildingId,
    /// Year of study, starting at 1.
    pub course_number: u8,
}

/// A student group inside a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Store identifier.
    pub id: GroupId,
    /// Owning course.
    pub course_id: CourseId,
    /// Group number within the course.
    pub group_number: u16,
}

/// Summary of a test shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    /// Store identifier.
    pub id: TestId,
    /// Title shown in the test list.
    pub title: String,
    /// Number of questions in the test.
    pub question_count: u16,
}

/// Which tests a profile may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestScope {
    /// Tests assigned to one student group.
    Group(GroupId),
    /// Tests published in one building.
    Building(BuildingId),
}
