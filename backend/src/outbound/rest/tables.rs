//! Table-backed ports: directory, invites, profiles and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::RestBackend;
use super::client::Filter;
use super::dto::{
    BuildingRow, CourseRow, GroupRow, InviteRedemption, InviteRow, ProfileRow, StudentRow,
    TeacherRow, TestRow,
};
use crate::domain::ports::{
    AcademicDirectory, AcademicDirectoryError, InviteCodeRepository, InviteCodeRepositoryError,
    ProfileRepository, ProfileRepositoryError, TestCatalogue, TestCatalogueError,
};
use crate::domain::{
    Building, BuildingId, Course, CourseId, Group, InviteCode, Profile, TestScope, TestSummary,
    UserId,
};

const BUILDINGS: &str = "buildings";
const COURSES: &str = "courses";
const GROUPS: &str = "groups";
const INVITE_CODES: &str = "invite_codes";
const STUDENTS: &str = "students";
const TEACHERS: &str = "teachers";
const TESTS: &str = "tests";

#[async_trait]
impl AcademicDirectory for RestBackend {
    async fn list_buildings(&self) -> Result<Vec<Building>, AcademicDirectoryError> {
        let rows: Vec<BuildingRow> = self
            .client
            .select(BUILDINGS, &[Filter::OrderAsc("id")])
            .await?;
        Ok(rows.into_iter().map(BuildingRow::into_domain).collect())
    }

    async fn find_building(
        &self,
        building_id: BuildingId,
    ) -> Result<Option<Building>, AcademicDirectoryError> {
        let rows: Vec<BuildingRow> = self
            .client
            .select(BUILDINGS, &[Filter::eq("id", building_id)])
            .await?;
        Ok(rows.into_iter().next().map(BuildingRow::into_domain))
    }

    async fn list_courses(
        &self,
        building_id: BuildingId,
    ) -> Result<Vec<Course>, AcademicDirectoryError> {
        let rows: Vec<CourseRow> = self
            .client
            .select(
                COURSES,
                &[
                    Filter::eq("building_id", building_id),
                    Filter::OrderAsc("course_number"),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(CourseRow::into_domain).collect())
    }

    async fn list_groups(&self, course_id: CourseId) -> Result<Vec<Group>, AcademicDirectoryError> {
        let rows: Vec<GroupRow> = self
            .client
            .select(
                GROUPS,
                &[
                    Filter::eq("course_id", course_id),
                    Filter::OrderAsc("group_number"),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(GroupRow::into_domain).collect())
    }
}

#[async_trait]
impl TestCatalogue for RestBackend {
    async fn list_tests(&self, scope: TestScope) -> Result<Vec<TestSummary>, TestCatalogueError> {
        let scope_filter = match scope {
            TestScope::Group(group_id) => Filter::eq("group_id", group_id),
            TestScope::Building(building_id) => Filter::eq("building_id", building_id),
        };
        let rows: Vec<TestRow> = self
            .client
            .select(TESTS, &[scope_filter, Filter::OrderAsc("title")])
            .await?;
        Ok(rows.into_iter().map(TestRow::into_domain).collect())
    }
}

#[async_trait]
impl InviteCodeRepository for RestBackend {
    async fn find_redeemable(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InviteCode>, InviteCodeRepositoryError> {
        let rows: Vec<InviteRow> = self
            .client
            .select(
                INVITE_CODES,
                &[Filter::eq("code", code), Filter::eq("is_used", false)],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(InviteRow::into_domain)
            .find(|invite| invite.is_redeemable_at(now)))
    }

    async fn redeem(
        &self,
        code: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, InviteCodeRepositoryError> {
        // The `is_used=eq.false` filter makes the update a compare-and-set.
        let changes = InviteRedemption {
            is_used: true,
            used_by: *user_id.as_uuid(),
            used_at: now,
        };
        let updated = self
            .client
            .update(
                INVITE_CODES,
                &[Filter::eq("code", code), Filter::eq("is_used", false)],
                &changes,
            )
            .await?;
        Ok(updated == 1)
    }

    async fn redeemed_by(&self, user_id: &UserId) -> Result<bool, InviteCodeRepositoryError> {
        let rows: Vec<serde_json::Value> = self
            .client
            .select(
                INVITE_CODES,
                &[Filter::eq("used_by", user_id), Filter::eq("is_used", true)],
            )
            .await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl ProfileRepository for RestBackend {
    async fn find_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let by_id = [Filter::eq("id", user_id)];
        let students: Vec<StudentRow> = self.client.select(STUDENTS, &by_id).await?;
        if let Some(student) = students.into_iter().next() {
            return Ok(Some(student.into_domain()));
        }
        let teachers: Vec<TeacherRow> = self.client.select(TEACHERS, &by_id).await?;
        Ok(teachers.into_iter().next().map(TeacherRow::into_domain))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        match ProfileRow::from_domain(profile) {
            ProfileRow::Student(row) => self.client.insert(STUDENTS, &row).await?,
            ProfileRow::Teacher(row) => self.client.insert(TEACHERS, &row).await?,
        }
        Ok(())
    }

    async fn teacher_email_exists(&self, email: &str) -> Result<bool, ProfileRepositoryError> {
        let rows: Vec<serde_json::Value> = self
            .client
            .select(TEACHERS, &[Filter::eq("email", email.to_lowercase())])
            .await?;
        Ok(!rows.is_empty())
    }
}
