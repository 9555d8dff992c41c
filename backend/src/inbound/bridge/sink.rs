//! WebSocket-backed message sink.

use actix_ws::Session;
use async_trait::async_trait;

use crate::domain::ports::{MessageSink, MessageSinkError};
use crate::protocol::{OutboundMessage, TargetOrigin};

use super::frame::OutboundFrame;

/// Posts outbound messages as text frames addressed to one iframe origin.
pub struct WsSink {
    session: Session,
    target_origin: TargetOrigin,
}

impl WsSink {
    /// Sink writing to `session`, stamping every frame with `target_origin`.
    pub fn new(session: Session, target_origin: TargetOrigin) -> Self {
        Self {
            session,
            target_origin,
        }
    }
}

#[async_trait]
impl MessageSink for WsSink {
    async fn post(&mut self, message: OutboundMessage) -> Result<(), MessageSinkError> {
        let frame = OutboundFrame {
            target_origin: &self.target_origin,
            message: &message,
        };
        let body = serde_json::to_string(&frame)
            .map_err(|error| MessageSinkError::encode(error.to_string()))?;
        self.session
            .text(body)
            .await
            .map_err(|_| MessageSinkError::closed())
    }
}
