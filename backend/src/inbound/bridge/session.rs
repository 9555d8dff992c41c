//! Per-connection bridge loop.
//!
//! Keeps WebSocket framing and heartbeats at the edge and hands every text
//! frame to the [`BridgeListener`]. The bridge pings every 5s and considers
//! a connection idle after 10s without relay traffic. Tests shorten both.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::ports::MessageSinkError;
use crate::protocol::TargetOrigin;

use super::listener::{BridgeListener, ListenerError};
use super::sink::WsSink;

/// Time between heartbeats to the relay (5s in production, shorter in tests).
#[cfg(not(test))]
pub(super) const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
pub(super) const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting (10s in production, shorter in tests).
#[cfg(not(test))]
pub(super) const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
pub(super) const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_bridge_session(
    listener: BridgeListener,
    target_origin: TargetOrigin,
    session: Session,
    stream: MessageStream,
) {
    let sink = WsSink::new(session.clone(), target_origin);
    BridgeSession { listener, sink }.run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidFrame(serde_json::Error),
    Network(Closed),
    Undeliverable(MessageSinkError),
}

impl From<ListenerError> for SessionError {
    fn from(error: ListenerError) -> Self {
        match error {
            ListenerError::InvalidFrame(source) => Self::InvalidFrame(source),
            ListenerError::Sink(source) => Self::Undeliverable(source),
        }
    }
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct BridgeSession {
    listener: BridgeListener,
    sink: WsSink,
}

impl BridgeSession {
    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(&error);
                close_session_if_needed(session, close_action_for(error)).await;
                return;
            }
        }
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                let outcome = self.listener.handle_text(text.as_ref(), &mut self.sink).await?;
                debug!(outcome = ?outcome, "bridge frame handled");
                Ok(())
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: &Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }

    session.ping(b"").await.map_err(SessionError::Network)
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!("bridge heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(error = %error, "bridge protocol error");
        }
        SessionError::InvalidFrame(error) => {
            warn!(error = %error, "relay sent an invalid bridge frame; closing connection");
        }
        SessionError::Network(error) => {
            warn!(error = %error, "bridge send failed; closing connection");
        }
        SessionError::Undeliverable(error) => {
            warn!(error = %error, "reply undeliverable; closing connection");
        }
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
    }
}

fn close_action_for(error: SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::InvalidFrame(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Policy,
            description: Some("invalid frame".to_owned()),
        })),
        SessionError::Undeliverable(MessageSinkError::Encode { .. }) => {
            CloseAction::Close(Some(CloseReason {
                code: CloseCode::Error,
                description: Some("encode failure".to_owned()),
            }))
        }
        SessionError::ClientClosed(reason) => CloseAction::Close(reason),
        SessionError::StreamClosed
        | SessionError::Network(_)
        | SessionError::Undeliverable(MessageSinkError::Closed) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "failed to close bridge session");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
