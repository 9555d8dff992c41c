//! Cascading resolution of the academic unit chain.
//!
//! Building → course → group lists are fetched one level at a time. Course
//! lists pass through a visibility rule table keyed by building name, and
//! [`UnitSelection`] keeps the parent/child invariant: choosing a new parent
//! clears everything below it.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{AcademicDirectory, AcademicDirectoryError};
use crate::domain::{Building, BuildingId, Course, CourseId, Group, GroupId};

/// Building name that only offers the first-year track.
pub const SHORT_PROGRAM_MARKER: &str = "СП-1";

/// Visibility rule for buildings with a given name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseVisibilityRule {
    /// Exact building name the rule applies to.
    pub building_name: String,
    /// Course numbers visible in matching buildings.
    pub course_numbers: BTreeSet<u8>,
}

impl CourseVisibilityRule {
    /// Rule showing `course_numbers` for buildings named `building_name`.
    pub fn new(building_name: impl Into<String>, course_numbers: impl IntoIterator<Item = u8>) -> Self {
        Self {
            building_name: building_name.into(),
            course_numbers: course_numbers.into_iter().collect(),
        }
    }
}

/// Rule table deciding which course numbers a building shows.
///
/// The first rule whose building name matches wins; unmatched buildings use
/// the fallback set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseVisibilityPolicy {
    rules: Vec<CourseVisibilityRule>,
    fallback: BTreeSet<u8>,
}

impl Default for CourseVisibilityPolicy {
    fn default() -> Self {
        Self::new(
            vec![CourseVisibilityRule::new(SHORT_PROGRAM_MARKER, [1])],
            [2, 3, 4],
        )
    }
}

impl CourseVisibilityPolicy {
    /// Build a policy from explicit rules and a fallback set.
    pub fn new(rules: Vec<CourseVisibilityRule>, fallback: impl IntoIterator<Item = u8>) -> Self {
        Self {
            rules,
            fallback: fallback.into_iter().collect(),
        }
    }

    /// Add a rule after the existing ones.
    #[must_use]
    pub fn with_rule(mut self, rule: CourseVisibilityRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Course numbers visible in the named building.
    #[must_use]
    pub fn visible_courses(&self, building_name: &str) -> &BTreeSet<u8> {
        self.rules
            .iter()
            .find(|rule| rule.building_name == building_name)
            .map_or(&self.fallback, |rule| &rule.course_numbers)
    }

    /// Keep only the courses visible in `building`, preserving order.
    #[must_use]
    pub fn filter(&self, building: &Building, courses: Vec<Course>) -> Vec<Course> {
        let visible = self.visible_courses(&building.name);
        courses
            .into_iter()
            .filter(|course| visible.contains(&course.course_number))
            .collect()
    }
}

/// Failures while resolving a level of the chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The parent building does not exist.
    #[error("building {0} was not found")]
    UnknownBuilding(BuildingId),
    /// The directory failed.
    #[error(transparent)]
    Directory(#[from] AcademicDirectoryError),
}

/// Resolves each level of the academic unit chain.
#[derive(Clone)]
pub struct CascadingResolver {
    directory: Arc<dyn AcademicDirectory>,
    policy: CourseVisibilityPolicy,
}

impl CascadingResolver {
    /// Resolver over a directory with the given visibility policy.
    pub fn new(directory: Arc<dyn AcademicDirectory>, policy: CourseVisibilityPolicy) -> Self {
        Self { directory, policy }
    }

    /// All buildings ordered by name.
    pub async fn resolve_buildings(&self) -> Result<Vec<Building>, ResolveError> {
        let mut buildings = self.directory.list_buildings().await?;
        buildings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buildings)
    }

    /// Courses of a building ordered by course number, after visibility rules.
    pub async fn resolve_courses(&self, building_id: BuildingId) -> Result<Vec<Course>, ResolveError> {
        let building = self
            .directory
            .find_building(building_id)
            .await?
            .ok_or(ResolveError::UnknownBuilding(building_id))?;
        let mut courses = self.directory.list_courses(building_id).await?;
        courses.sort_by_key(|course| course.course_number);
        let fetched = courses.len();
        let visible = self.policy.filter(&building, courses);
        debug!(
            building_id = building_id.get(),
            fetched,
            visible = visible.len(),
            "resolved courses"
        );
        Ok(visible)
    }

    /// Groups of a course ordered by group number.
    pub async fn resolve_groups(&self, course_id: CourseId) -> Result<Vec<Group>, ResolveError> {
        let mut groups = self.directory.list_groups(course_id).await?;
        groups.sort_by_key(|group| group.group_number);
        Ok(groups)
    }
}

/// Current position in the building → course → group chain.
///
/// ## Invariants
/// - `course` is only set while `building` is set.
/// - `group` is only set while `course` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitSelection {
    building: Option<BuildingId>,
    course: Option<CourseId>,
    group: Option<GroupId>,
}

impl UnitSelection {
    /// Selected building.
    #[must_use]
    pub fn building(&self) -> Option<BuildingId> {
        self.building
    }

    /// Selected course.
    #[must_use]
    pub fn course(&self) -> Option<CourseId> {
        self.course
    }

    /// Selected group.
    #[must_use]
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Select a building and clear the course and group.
    pub fn select_building(&mut self, building_id: BuildingId) {
        *self = Self {
            building: Some(building_id),
            course: None,
            group: None,
        };
    }

    /// Select a course and clear the group. Ignored without a building.
    pub fn select_course(&mut self, course_id: CourseId) -> bool {
        if self.building.is_none() {
            return false;
        }
        self.course = Some(course_id);
        self.group = None;
        true
    }

    /// Select a group. Ignored without a course.
    pub fn select_group(&mut self, group_id: GroupId) -> bool {
        if self.course.is_none() {
            return false;
        }
        self.group = Some(group_id);
        true
    }

    /// Forget every selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
