//! Surface-side academic unit selection.
//!
//! Results for dependent lists echo the parent they were resolved for. A
//! result whose parent no longer matches the current selection belongs to a
//! superseded request and is dropped, so a fast building change can never
//! show the previous building's courses.

use tracing::debug;

use crate::domain::{Building, BuildingId, Course, CourseId, Group, GroupId, UnitSelection};
use crate::protocol::{InboundMessage, OutboundMessage, Resource};

use super::LoadingFlags;
use super::view::{Banner, SelectOption, SelectorView};

const DEGRADED_NOTICE: &str =
    "Buildings could not be loaded; showing the built-in list. Some entries may be out of date.";

/// Buildings offered when the directory cannot be reached.
#[must_use]
pub fn fallback_buildings() -> Vec<Building> {
    vec![
        Building::new(BuildingId::new(1), "Главный корпус"),
        Building::new(BuildingId::new(2), "Корпус 2"),
        Building::new(BuildingId::new(3), "СП-1"),
    ]
}

/// Loaded lists and current choices of the building → course → group chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selection: UnitSelection,
    buildings: Vec<Building>,
    courses: Vec<Course>,
    groups: Vec<Group>,
    degraded: bool,
    load_error: Option<String>,
}

impl SelectionState {
    /// Current choices.
    #[must_use]
    pub fn selection(&self) -> UnitSelection {
        self.selection
    }

    /// Whether the building list is the static fallback.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Loaded courses of the selected building.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Loaded groups of the selected course.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Choose a building; clears course and group choices and lists.
    pub fn select_building(&mut self, building_id: BuildingId) -> InboundMessage {
        self.selection.select_building(building_id);
        self.courses.clear();
        self.groups.clear();
        self.load_error = None;
        InboundMessage::BuildingSelected { building_id }
    }

    /// Choose a course; refused until a building is chosen.
    pub fn select_course(&mut self, course_id: CourseId) -> Option<InboundMessage> {
        if !self.selection.select_course(course_id) {
            debug!(course_id = course_id.get(), "course choice refused without a building");
            return None;
        }
        self.groups.clear();
        self.load_error = None;
        Some(InboundMessage::CourseSelected { course_id })
    }

    /// Choose a group; refused until a course is chosen.
    pub fn select_group(&mut self, group_id: GroupId) -> Option<InboundMessage> {
        if !self.selection.select_group(group_id) {
            debug!(group_id = group_id.get(), "group choice refused without a course");
            return None;
        }
        Some(InboundMessage::GroupSelected { group_id })
    }

    /// Apply a list result or load failure. Other messages are ignored.
    pub fn receive(&mut self, message: &OutboundMessage) {
        match message {
            OutboundMessage::BuildingsLoaded { buildings } => {
                self.buildings = buildings.clone();
                self.degraded = false;
            }
            OutboundMessage::CoursesLoaded {
                building_id,
                courses,
            } => {
                if self.selection.building() == Some(*building_id) {
                    self.courses = courses.clone();
                } else {
                    debug!(building_id = building_id.get(), "stale course list dropped");
                }
            }
            OutboundMessage::GroupsLoaded { course_id, groups } => {
                if self.selection.course() == Some(*course_id) {
                    self.groups = groups.clone();
                } else {
                    debug!(course_id = course_id.get(), "stale group list dropped");
                }
            }
            OutboundMessage::LoadError {
                resource: Resource::Buildings,
                message,
            } => {
                debug!(error = %message, "building list unavailable; using fallback");
                self.buildings = fallback_buildings();
                self.degraded = true;
            }
            OutboundMessage::LoadError {
                resource: Resource::Courses | Resource::Groups,
                message,
            } => {
                self.load_error = Some(message.clone());
            }
            _ => {}
        }
    }

    /// Building dropdown.
    #[must_use]
    pub fn building_selector(&self, loading: &LoadingFlags) -> SelectorView {
        let selected = self.selection.building();
        SelectorView {
            enabled: !loading.is_loading(Resource::Buildings),
            loading: loading.is_loading(Resource::Buildings),
            options: self
                .buildings
                .iter()
                .map(|building| SelectOption {
                    value: building.id.get(),
                    label: building.name.clone(),
                    selected: selected == Some(building.id),
                })
                .collect(),
        }
    }

    /// Course dropdown; enabled once a building is chosen.
    #[must_use]
    pub fn course_selector(&self, loading: &LoadingFlags) -> SelectorView {
        let selected = self.selection.course();
        SelectorView {
            enabled: self.selection.building().is_some() && !loading.is_loading(Resource::Courses),
            loading: loading.is_loading(Resource::Courses),
            options: self
                .courses
                .iter()
                .map(|course| SelectOption {
                    value: course.id.get(),
                    label: format!("Course {}", course.course_number),
                    selected: selected == Some(course.id),
                })
                .collect(),
        }
    }

    /// Group dropdown; enabled once a course is chosen.
    #[must_use]
    pub fn group_selector(&self, loading: &LoadingFlags) -> SelectorView {
        let selected = self.selection.group();
        SelectorView {
            enabled: self.selection.course().is_some() && !loading.is_loading(Resource::Groups),
            loading: loading.is_loading(Resource::Groups),
            options: self
                .groups
                .iter()
                .map(|group| SelectOption {
                    value: group.id.get(),
                    label: format!("Group {}", group.group_number),
                    selected: selected == Some(group.id),
                })
                .collect(),
        }
    }

    /// Degraded-mode or load-failure banner.
    #[must_use]
    pub fn banner(&self) -> Option<Banner> {
        if let Some(message) = &self.load_error {
            return Some(Banner::error(message.clone()));
        }
        self.degraded.then(|| Banner::warning(DEGRADED_NOTICE))
    }
}
