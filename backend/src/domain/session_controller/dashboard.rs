//! Dashboard actions: profile, tests, sign-out.
//!
//! Every action requires a session; without one the dashboard is told the
//! user is not signed in and no backend call is made.

use tracing::{info, warn};

use super::{SessionController, ensure_profile, reject_unauthenticated};
use crate::domain::ports::{MessageSink, MessageSinkError};
use crate::domain::{AuthIdentity, TestId};
use crate::protocol::{OutboundMessage, Resource, SurfaceKind};

const PROFILE_NOT_FOUND: &str = "Profile not found. You can recreate it from your account details.";
const PROFILE_LOAD_FAILED: &str = "Could not load your profile. Please try again.";
const PROFILE_RECREATE_FAILED: &str =
    "Could not recreate your profile. Please contact your administrator.";
const TEST_UNAVAILABLE: &str = "That test is not available.";

impl SessionController {
    pub(super) async fn load_profile(
        &mut self,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        let Some(user_id) = self.signed_in_user() else {
            return reject_unauthenticated(sink).await;
        };
        sink.post(OutboundMessage::loading(Resource::Profile, true))
            .await?;

        let reply = match self.profile.clone() {
            Some(profile) => OutboundMessage::ProfileLoaded { profile },
            None => match self.ports.profiles.find_profile(&user_id).await {
                Ok(Some(profile)) => {
                    self.profile = Some(profile.clone());
                    OutboundMessage::ProfileLoaded { profile }
                }
                Ok(None) => OutboundMessage::ProfileNotFound {
                    message: PROFILE_NOT_FOUND.to_owned(),
                },
                Err(error) => {
                    warn!(user_id = %user_id, error = %error, "profile lookup failed");
                    OutboundMessage::ErrorState {
                        message: PROFILE_LOAD_FAILED.to_owned(),
                    }
                }
            },
        };
        sink.post(reply).await?;
        sink.post(OutboundMessage::loading(Resource::Profile, false))
            .await
    }

    pub(super) async fn load_tests(
        &mut self,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        if self.session.is_none() {
            return reject_unauthenticated(sink).await;
        }
        sink.post(OutboundMessage::loading(Resource::Tests, true))
            .await?;

        let scope = self.profile.as_ref().and_then(|profile| profile.test_scope());
        let reply = match scope {
            None => OutboundMessage::TestsLoaded { tests: Vec::new() },
            Some(scope) => match self.ports.tests.list_tests(scope).await {
                Ok(tests) => OutboundMessage::TestsLoaded { tests },
                Err(error) => {
                    warn!(error = %error, "test listing failed");
                    OutboundMessage::LoadError {
                        resource: Resource::Tests,
                        message: error.to_string(),
                    }
                }
            },
        };
        sink.post(reply).await?;
        sink.post(OutboundMessage::loading(Resource::Tests, false))
            .await
    }

    pub(super) async fn recreate_profile(
        &mut self,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        let Some(session) = self.session.as_ref() else {
            return reject_unauthenticated(sink).await;
        };
        let identity = self.fresh_identity(session.access_token(), session.identity()).await;

        let reply = match ensure_profile(
            self.ports.profiles.as_ref(),
            self.ports.invites.as_ref(),
            &identity,
        ).await {
            Ok(profile) => {
                info!(user_id = %identity.user_id, "profile recreated");
                self.profile = Some(profile.clone());
                OutboundMessage::ProfileRecreated { profile }
            }
            Err(error) => {
                warn!(user_id = %identity.user_id, error = %error, "profile recreation failed");
                OutboundMessage::ErrorState {
                    message: PROFILE_RECREATE_FAILED.to_owned(),
                }
            }
        };
        sink.post(reply).await
    }

    /// Latest identity metadata from the provider, or the session's copy
    /// when the provider cannot be asked.
    async fn fresh_identity(&self, access_token: &str, cached: &AuthIdentity) -> AuthIdentity {
        match self.ports.identity.current_user(access_token).await {
            Ok(identity) => identity,
            Err(error) => {
                warn!(error = %error, "current user lookup failed; using session identity");
                cached.clone()
            }
        }
    }

    pub(super) async fn start_test(
        &mut self,
        test_id: TestId,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        if self.session.is_none() {
            return reject_unauthenticated(sink).await;
        }

        let Some(scope) = self.profile.as_ref().and_then(|profile| profile.test_scope()) else {
            return post_unavailable(sink).await;
        };
        let found = match self.ports.tests.list_tests(scope).await {
            Ok(tests) => tests.into_iter().find(|test| test.id == test_id),
            Err(error) => {
                warn!(test_id = test_id.get(), error = %error, "test lookup failed");
                None
            }
        };
        match found {
            Some(test) => {
                info!(test_id = test_id.get(), "test started");
                self.mount(SurfaceKind::TestSession, sink).await?;
                sink.post(OutboundMessage::TestStarted { test }).await
            }
            None => post_unavailable(sink).await,
        }
    }

    pub(super) async fn logout(
        &mut self,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MessageSinkError> {
        if let Some(session) = self.end_session() {
            if let Err(error) = self.ports.identity.sign_out(session.access_token()).await {
                warn!(error = %error, "sign-out failed at identity provider; session dropped locally");
            }
        }
        self.mount(SurfaceKind::Login, sink).await
    }
}

async fn post_unavailable(sink: &mut dyn MessageSink) -> Result<(), MessageSinkError> {
    sink.post(OutboundMessage::ErrorState {
        message: TEST_UNAVAILABLE.to_owned(),
    })
    .await
}
