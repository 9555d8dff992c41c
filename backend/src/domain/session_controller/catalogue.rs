//! Academic unit loading and invite code checks.
//!
//! Each load is bracketed by `LOADING_STATE` toggles. Load failures carry
//! the backend's own message since they reveal nothing about accounts.

use tracing::{debug, warn};

use super::SessionController;
use crate::domain::ports::{MessageSink, MessageSinkError};
use crate::domain::{
    BuildingId, CourseId, GroupId, INVITE_CODE_MIN_LEN, ResolveError, sanitize,
};
use crate::protocol::{OutboundMessage, Resource};

const INVITE_TOO_SHORT: &str = "Invite code must be at least 3 characters.";
const INVITE_VALID: &str = "Invite code is valid.";
const INVITE_INVALID: &str = "Invite code is invalid, used or expired.";
const INVITE_CHECK_FAILED: &str = "Could not check the invite code. Please try again.";

impl SessionController {
    pub(super) async fn load_buildings(
        &mut self,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        sink.post(OutboundMessage::loading(Resource::Buildings, true))
            .await?;
        let result = self
            .resolver
            .resolve_buildings()
            .await
            .map(|buildings| OutboundMessage::BuildingsLoaded { buildings });
        finish_load(sink, Resource::Buildings, result).await
    }

    pub(super) async fn building_selected(
        &mut self,
        building_id: BuildingId,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        self.selection.select_building(building_id);
        sink.post(OutboundMessage::loading(Resource::Courses, true))
            .await?;
        let result = self
            .resolver
            .resolve_courses(building_id)
            .await
            .map(|courses| OutboundMessage::CoursesLoaded {
                building_id,
                courses,
            });
        finish_load(sink, Resource::Courses, result).await
    }

    pub(super) async fn course_selected(
        &mut self,
        course_id: CourseId,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        if !self.selection.select_course(course_id) {
            debug!(
                course_id = course_id.get(),
                "course selected before any building; resolving anyway"
            );
        }
        sink.post(OutboundMessage::loading(Resource::Groups, true))
            .await?;
        let result = self
            .resolver
            .resolve_groups(course_id)
            .await
            .map(|groups| OutboundMessage::GroupsLoaded { course_id, groups });
        finish_load(sink, Resource::Groups, result).await
    }

    pub(super) fn group_selected(&mut self, group_id: GroupId) {
        if self.selection.select_group(group_id) {
            debug!(group_id = group_id.get(), "group selected");
        } else {
            debug!(group_id = group_id.get(), "group selected before any course; ignored");
        }
    }

    pub(super) async fn validate_invite_code(
        &mut self,
        raw_code: &str,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        let code = sanitize(raw_code);
        let (valid, message) = if code.chars().count() < INVITE_CODE_MIN_LEN {
            (false, INVITE_TOO_SHORT)
        } else {
            match self
                .ports
                .invites
                .find_redeemable(&code, self.clock.utc())
                .await
            {
                Ok(Some(_)) => (true, INVITE_VALID),
                Ok(None) => (false, INVITE_INVALID),
                Err(error) => {
                    warn!(error = %error, "invite code lookup failed");
                    (false, INVITE_CHECK_FAILED)
                }
            }
        };
        sink.post(OutboundMessage::InviteCodeValidationResult {
            valid,
            message: message.to_owned(),
        })
        .await
    }
}

async fn finish_load(
    sink: &mut dyn MessageSink,
    resource: Resource,
    result: Result<OutboundMessage, ResolveError>,
) -> Result<(), MessageSinkError> {
    let reply = result.unwrap_or_else(|error| {
        warn!(resource = ?resource, error = %error, "resource load failed");
        OutboundMessage::LoadError {
            resource,
            message: error.to_string(),
        }
    });
    sink.post(reply).await?;
    sink.post(OutboundMessage::loading(resource, false)).await
}
