//! Plain HTTP endpoints served next to the bridge.

pub mod health;

pub use health::{HealthState, live, ready};
