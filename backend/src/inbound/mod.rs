//! Inbound adapters that translate relay traffic into controller calls while
//! keeping framework details at the edge.
//!
//! The WebSocket bridge lives under [`bridge`]; probes under [`http`].

pub mod bridge;
pub mod http;
