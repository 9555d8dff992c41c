//! Student and teacher portal backend.
//!
//! The host-side [`domain::SessionController`] talks to embedded surfaces
//! through a typed message protocol relayed over a WebSocket bridge.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod protocol;
pub mod settings;
pub mod surface;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
