//! Bridge frames exchanged with the host relay.
//!
//! The relay forwards each iframe `message` event as an [`InboundFrame`]
//! carrying the browser-reported sender origin, and posts each
//! [`OutboundFrame`] into the iframe with exactly its `targetOrigin`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{OutboundMessage, TargetOrigin};

/// A relayed iframe message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundFrame {
    /// Origin of the sending window.
    pub origin: String,
    /// The undecoded `{ type, data }` message.
    pub message: Value,
}

/// A message addressed to the iframe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFrame<'a> {
    /// Origin the relay must pass to `postMessage`.
    pub target_origin: &'a TargetOrigin,
    /// The message itself.
    pub message: &'a OutboundMessage,
}
