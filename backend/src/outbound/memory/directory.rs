//! Academic directory and test catalogue over the in-memory store.

use async_trait::async_trait;

use crate::domain::ports::{
    AcademicDirectory, AcademicDirectoryError, TestCatalogue, TestCatalogueError,
};
use crate::domain::{Building, BuildingId, Course, CourseId, Group, TestScope, TestSummary};

use super::{MemoryBackend, hop};

const OFFLINE: &str = "directory offline";

#[async_trait]
impl AcademicDirectory for MemoryBackend {
    async fn list_buildings(&self) -> Result<Vec<Building>, AcademicDirectoryError> {
        hop().await;
        let store = self.lock();
        if store.directory_offline {
            return Err(AcademicDirectoryError::connection(OFFLINE));
        }
        Ok(store.buildings.clone())
    }

    async fn find_building(
        &self,
        building_id: BuildingId,
    ) -> Result<Option<Building>, AcademicDirectoryError> {
        hop().await;
        let store = self.lock();
        if store.directory_offline {
            return Err(AcademicDirectoryError::connection(OFFLINE));
        }
        Ok(store
            .buildings
            .iter()
            .find(|building| building.id == building_id)
            .cloned())
    }

    async fn list_courses(
        &self,
        building_id: BuildingId,
    ) -> Result<Vec<Course>, AcademicDirectoryError> {
        hop().await;
        let store = self.lock();
        if store.directory_offline {
            return Err(AcademicDirectoryError::connection(OFFLINE));
        }
        Ok(store
            .courses
            .iter()
            .filter(|course| course.building_id == building_id)
            .copied()
            .collect())
    }

    async fn list_groups(&self, course_id: CourseId) -> Result<Vec<Group>, AcademicDirectoryError> {
        hop().await;
        let store = self.lock();
        if store.directory_offline {
            return Err(AcademicDirectoryError::connection(OFFLINE));
        }
        Ok(store
            .groups
            .iter()
            .filter(|group| group.course_id == course_id)
            .copied()
            .collect())
    }
}

#[async_trait]
impl TestCatalogue for MemoryBackend {
    async fn list_tests(&self, scope: TestScope) -> Result<Vec<TestSummary>, TestCatalogueError> {
        hop().await;
        let mut tests: Vec<TestSummary> = self
            .lock()
            .tests
            .iter()
            .filter(|(published, _)| *published == scope)
            .map(|(_, test)| test.clone())
            .collect();
        tests.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(tests)
    }
}
