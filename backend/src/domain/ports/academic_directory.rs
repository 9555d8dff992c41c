//! Read-side port for the academic unit chain.
//!
//! Adapters return rows in store order; the cascading resolver applies the
//! ordering and visibility rules, so implementations stay simple lookups.

use async_trait::async_trait;

use crate::domain::{Building, BuildingId, Course, CourseId, Group};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading buildings, courses or groups.
    pub enum AcademicDirectoryError {
        /// The table store could not be reached.
        Connection { message: String } =>
            "academic directory connection failed: {message}",
        /// The query failed or returned rows that could not be decoded.
        Query { message: String } =>
            "academic directory query failed: {message}",
    }
}

/// Port for listing academic units.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AcademicDirectory: Send + Sync {
    /// Every building.
    async fn list_buildings(&self) -> Result<Vec<Building>, AcademicDirectoryError>;

    /// One building by id, or `None` when it does not exist.
    async fn find_building(
        &self,
        building_id: BuildingId,
    ) -> Result<Option<Building>, AcademicDirectoryError>;

    /// Courses offered in a building.
    async fn list_courses(
        &self,
        building_id: BuildingId,
    ) -> Result<Vec<Course>, AcademicDirectoryError>;

    /// Groups inside a course.
    async fn list_groups(&self, course_id: CourseId) -> Result<Vec<Group>, AcademicDirectoryError>;
}
