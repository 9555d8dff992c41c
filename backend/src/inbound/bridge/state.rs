//! Shared bridge adapter state.
//!
//! One [`BridgeState`] lives in the server; every accepted connection gets a
//! fresh [`SessionController`] built from it. The ports, the attempt limiter
//! and the clock are shared by all connections.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::{AttemptLimiter, CourseVisibilityPolicy, PortalPorts, SessionController};
use crate::protocol::TargetOrigin;

use super::listener::BridgeListener;
use super::origin_guard::OriginGuard;

/// Dependency bundle for the bridge endpoint.
#[derive(Clone)]
pub struct BridgeState {
    ports: PortalPorts,
    limiter: Arc<AttemptLimiter>,
    clock: Arc<dyn Clock + Send + Sync>,
    guard: Arc<OriginGuard>,
    target_origin: TargetOrigin,
    visibility: CourseVisibilityPolicy,
}

impl BridgeState {
    /// Construct state from explicit port implementations.
    pub fn new(
        ports: PortalPorts,
        limiter: Arc<AttemptLimiter>,
        clock: Arc<dyn Clock + Send + Sync>,
        guard: OriginGuard,
        target_origin: TargetOrigin,
    ) -> Self {
        Self {
            ports,
            limiter,
            clock,
            guard: Arc::new(guard),
            target_origin,
            visibility: CourseVisibilityPolicy::default(),
        }
    }

    /// Replace the course visibility rules used by new connections.
    #[must_use]
    pub fn with_visibility_policy(mut self, policy: CourseVisibilityPolicy) -> Self {
        self.visibility = policy;
        self
    }

    /// Sender allow-list.
    pub fn guard(&self) -> &OriginGuard {
        &self.guard
    }

    /// Origin every outbound frame is addressed to.
    pub fn target_origin(&self) -> &TargetOrigin {
        &self.target_origin
    }

    /// Listener with a fresh controller for a new connection.
    pub fn listener(&self) -> BridgeListener {
        let controller = SessionController::new(
            self.ports.clone(),
            Arc::clone(&self.limiter),
            Arc::clone(&self.clock),
        )
        .with_visibility_policy(self.visibility.clone());
        BridgeListener::new(Arc::clone(&self.guard), controller)
    }
}
