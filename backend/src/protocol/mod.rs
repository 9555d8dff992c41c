//! Cross-frame message protocol shared by the controller and the surfaces.
//!
//! Every message is one `{ "type": ..., "data": ... }` value. There are no
//! sequence numbers or correlation ids: a request and its result are two
//! independent messages, and results for dependent resources echo the parent
//! id they were resolved for.

mod envelope;
mod messages;
mod origin;

pub use envelope::{DecodeError, Envelope, decode_envelope, decode_inbound};
pub use messages::{InboundMessage, OutboundMessage, Resource, SurfaceKind};
pub use origin::{TargetOrigin, TargetOriginError};
