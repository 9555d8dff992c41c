//! Outbound adapters implementing the backend ports.
//!
//! - **memory**: seeded in-process store for development and tests
//! - **rest**: hosted table store and identity service over HTTP
//!
//! Adapters translate between domain types and transport representations.
//! They contain no portal logic.

pub mod memory;
pub mod rest;
