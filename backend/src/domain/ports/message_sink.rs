//! Driven port the controller posts outbound protocol messages through.
//!
//! The bridge adapter implements it on top of a WebSocket session and stamps
//! each message with the surface's target origin; tests record messages.

use async_trait::async_trait;

use crate::protocol::OutboundMessage;

use super::define_port_error;

define_port_error! {
    /// Delivery failures. Any error ends the connection.
    pub enum MessageSinkError {
        /// The peer went away.
        Closed => "message sink closed",
        /// The message could not be encoded.
        Encode { message: String } => "failed to encode outbound message: {message}",
    }
}

/// Destination for controller output, in post order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSink: Send {
    /// Deliver one message.
    async fn post(&mut self, message: OutboundMessage) -> Result<(), MessageSinkError>;
}
