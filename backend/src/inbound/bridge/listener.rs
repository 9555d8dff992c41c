//! Inbound frame handling: origin check, decoding, dispatch.
//!
//! Frames from untrusted origins and messages that cannot be decoded are
//! dropped without any reply. Each accepted message runs in its own trace
//! scope so every log line it produces can be correlated.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::ports::{MessageSink, MessageSinkError};
use crate::domain::{SessionController, TraceId};
use crate::protocol::{DecodeError, decode_inbound};

use super::frame::InboundFrame;
use super::origin_guard::OriginGuard;

/// Why a frame ended the connection.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The relay sent something that is not a bridge frame.
    #[error("invalid bridge frame: {0}")]
    InvalidFrame(#[source] serde_json::Error),
    /// A reply could not be delivered.
    #[error(transparent)]
    Sink(#[from] MessageSinkError),
}

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Decoded and handled by the controller.
    Dispatched,
    /// Sender origin not on the allow-list.
    UntrustedOrigin,
    /// Type not part of the protocol.
    UnknownType,
    /// Known type with a bad payload, or not an envelope at all.
    Malformed,
}

/// Per-connection inbound handler.
pub struct BridgeListener {
    guard: Arc<OriginGuard>,
    controller: SessionController,
}

impl BridgeListener {
    /// Listener feeding `controller`.
    pub fn new(guard: Arc<OriginGuard>, controller: SessionController) -> Self {
        Self { guard, controller }
    }

    /// The controller behind this connection.
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Handle one text frame from the relay.
    ///
    /// # Errors
    /// Fails when the text is not a bridge frame or a reply cannot be
    /// delivered; the connection should then be closed.
    pub async fn handle_text(
        &mut self,
        text: &str,
        sink: &mut dyn MessageSink,
    ) -> Result<FrameOutcome, ListenerError> {
        let frame: InboundFrame =
            serde_json::from_str(text).map_err(ListenerError::InvalidFrame)?;
        self.handle_frame(frame, sink).await
    }

    /// Handle one parsed frame.
    ///
    /// # Errors
    /// Fails when a reply cannot be delivered.
    pub async fn handle_frame(
        &mut self,
        frame: InboundFrame,
        sink: &mut dyn MessageSink,
    ) -> Result<FrameOutcome, ListenerError> {
        if !self.guard.is_trusted(&frame.origin) {
            warn!(origin = %frame.origin, "dropped message from untrusted origin");
            return Ok(FrameOutcome::UntrustedOrigin);
        }

        let message = match decode_inbound(frame.message) {
            Ok(message) => message,
            Err(DecodeError::UnknownType(message_type)) => {
                info!(message_type = %message_type, "ignored unknown message type");
                return Ok(FrameOutcome::UnknownType);
            }
            Err(error) => {
                warn!(error = %error, "dropped malformed message");
                return Ok(FrameOutcome::Malformed);
            }
        };

        let trace_id = TraceId::generate();
        let controller = &mut self.controller;
        TraceId::scope(trace_id, async move {
            debug!(trace_id = %trace_id, message_type = message.type_name(), "dispatching");
            controller.dispatch(message, sink).await
        })
        .await?;
        Ok(FrameOutcome::Dispatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAcademicDirectory, MockIdentityProvider, MockInviteCodeRepository,
        MockProfileRepository, MockTestCatalogue,
    };
    use crate::domain::{
        AttemptLimiter, Building, BuildingId, PortalPorts, RateLimitPolicy,
    };
    use crate::test_support::{MutableClock, RecordingSink};
    use mockable::Clock;
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn listener_with(directory: MockAcademicDirectory) -> BridgeListener {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MutableClock::fixed());
        let ports = PortalPorts {
            directory: Arc::new(directory),
            identity: Arc::new(MockIdentityProvider::new()),
            invites: Arc::new(MockInviteCodeRepository::new()),
            profiles: Arc::new(MockProfileRepository::new()),
            tests: Arc::new(MockTestCatalogue::new()),
        };
        let limiter = Arc::new(AttemptLimiter::new(clock.clone(), RateLimitPolicy::default()));
        let guard = OriginGuard::parse(["http://localhost:3000"]).expect("allow-list");
        BridgeListener::new(Arc::new(guard), SessionController::new(ports, limiter, clock))
    }

    #[fixture]
    fn untouched_listener() -> BridgeListener {
        let mut directory = MockAcademicDirectory::new();
        directory.expect_list_buildings().never();
        listener_with(directory)
    }

    fn frame(origin: &str, message: serde_json::Value) -> String {
        json!({ "origin": origin, "message": message }).to_string()
    }

    #[rstest]
    #[case::foreign("https://evil.example")]
    #[case::null("null")]
    #[case::other_port("http://localhost:3001")]
    #[tokio::test]
    async fn untrusted_origin_gets_no_reply(
        mut untouched_listener: BridgeListener,
        #[case] origin: &str,
    ) {
        let mut sink = RecordingSink::default();
        let outcome = untouched_listener
            .handle_text(
                &frame(origin, json!({ "type": "LOAD_BUILDINGS_REQUEST" })),
                &mut sink,
            )
            .await
            .expect("handled");

        assert_eq!(outcome, FrameOutcome::UntrustedOrigin);
        assert!(sink.messages().is_empty());
    }

    #[rstest]
    #[case::unknown(json!({ "type": "FORMAT_HARD_DRIVE", "data": {} }), FrameOutcome::UnknownType)]
    #[case::malformed(
        json!({ "type": "BUILDING_SELECTED", "data": { "buildingId": "one" } }),
        FrameOutcome::Malformed
    )]
    #[case::not_envelope(json!("LOAD_BUILDINGS_REQUEST"), FrameOutcome::Malformed)]
    #[tokio::test]
    async fn undecodable_messages_are_ignored(
        mut untouched_listener: BridgeListener,
        #[case] message: serde_json::Value,
        #[case] expected: FrameOutcome,
    ) {
        let mut sink = RecordingSink::default();
        let outcome = untouched_listener
            .handle_text(&frame("http://localhost:3000", message), &mut sink)
            .await
            .expect("handled");

        assert_eq!(outcome, expected);
        assert!(sink.messages().is_empty());
        assert!(!untouched_listener.controller().is_signed_in());
    }

    #[rstest]
    #[tokio::test]
    async fn trusted_message_reaches_the_controller() {
        let mut directory = MockAcademicDirectory::new();
        directory
            .expect_list_buildings()
            .times(1)
            .returning(|| Ok(vec![Building::new(BuildingId::new(1), "Main")]));
        let mut listener = listener_with(directory);
        let mut sink = RecordingSink::default();

        let outcome = listener
            .handle_text(
                &frame("http://localhost:3000", json!({ "type": "LOAD_BUILDINGS_REQUEST" })),
                &mut sink,
            )
            .await
            .expect("handled");

        assert_eq!(outcome, FrameOutcome::Dispatched);
        assert_eq!(
            sink.type_names(),
            ["LOADING_STATE", "BUILDINGS_LOADED", "LOADING_STATE"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn non_frame_text_is_an_error(mut untouched_listener: BridgeListener) {
        let mut sink = RecordingSink::default();
        let error = untouched_listener
            .handle_text("not-json", &mut sink)
            .await
            .expect_err("invalid frame");
        assert!(matches!(error, ListenerError::InvalidFrame(_)));
    }
}
