//! Host-side harness for end-to-end flow tests.
//!
//! Plays the part of the relay: every controller reply is handed to the
//! mounted surface, and whatever the surface asks for next is dispatched
//! back to the controller until both sides go quiet.

use std::collections::VecDeque;
use std::sync::Arc;

use mockable::Clock;
use portal::domain::{AttemptLimiter, ErrorCode, RateLimitPolicy, SessionController};
use portal::outbound::memory::MemoryBackend;
use portal::protocol::{InboundMessage, OutboundMessage};
use portal::surface::{
    DashboardAction, LoginAction, MountedSurface, StudentSignupAction, Surface,
    TeacherSignupAction,
};
use portal::test_support::{MutableClock, RecordingSink};

/// One connection: controller, relay and the surface the host shows.
pub struct Portal {
    pub controller: SessionController,
    pub mounted: MountedSurface,
    received: Vec<OutboundMessage>,
    sink: RecordingSink,
}

impl Portal {
    /// Connection with its own limiter and a frozen clock.
    pub fn new(backend: &MemoryBackend) -> Self {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MutableClock::fixed());
        let limiter = Arc::new(AttemptLimiter::new(
            Arc::clone(&clock),
            RateLimitPolicy::default(),
        ));
        Self::sharing(backend, limiter, clock)
    }

    /// Connection sharing a limiter and clock with other connections.
    pub fn sharing(
        backend: &MemoryBackend,
        limiter: Arc<AttemptLimiter>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            controller: SessionController::new(backend.ports(), limiter, clock),
            mounted: MountedSurface::default(),
            received: Vec::new(),
            sink: RecordingSink::default(),
        }
    }

    /// Deliver `message` and everything it sets off.
    pub async fn send(&mut self, message: InboundMessage) {
        self.send_all(vec![message]).await;
    }

    async fn send_all(&mut self, messages: Vec<InboundMessage>) {
        let mut pending = VecDeque::from(messages);
        while let Some(next) = pending.pop_front() {
            self.controller
                .dispatch(next, &mut self.sink)
                .await
                .expect("recording sink accepts every message");
            for reply in self.sink.drain() {
                pending.extend(self.mounted.receive(&reply));
                self.received.push(reply);
            }
        }
    }

    /// Act on the student registration form.
    pub async fn student(&mut self, action: StudentSignupAction) {
        let kind = self.mounted.kind();
        let MountedSurface::StudentSignup(surface) = &mut self.mounted else {
            panic!("student signup is not mounted; {kind:?} is");
        };
        let requests = surface.dispatch(action);
        self.send_all(requests).await;
    }

    /// Act on the teacher registration form.
    pub async fn teacher(&mut self, action: TeacherSignupAction) {
        let kind = self.mounted.kind();
        let MountedSurface::TeacherSignup(surface) = &mut self.mounted else {
            panic!("teacher signup is not mounted; {kind:?} is");
        };
        let requests = surface.dispatch(action);
        self.send_all(requests).await;
    }

    /// Act on the sign-in form.
    pub async fn login(&mut self, action: LoginAction) {
        let kind = self.mounted.kind();
        let MountedSurface::Login(surface) = &mut self.mounted else {
            panic!("sign-in is not mounted; {kind:?} is");
        };
        let requests = surface.dispatch(action);
        self.send_all(requests).await;
    }

    /// Act on the dashboard.
    pub async fn dashboard(&mut self, action: DashboardAction) {
        let kind = self.mounted.kind();
        let MountedSurface::Dashboard(surface) = &mut self.mounted else {
            panic!("dashboard is not mounted; {kind:?} is");
        };
        let requests = surface.dispatch(action);
        self.send_all(requests).await;
    }

    /// Replies received since the last call.
    pub fn take_received(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.received)
    }

    /// Wire names of the replies received since the last call.
    pub fn take_types(&mut self) -> Vec<&'static str> {
        self.take_received()
            .iter()
            .map(OutboundMessage::type_name)
            .collect()
    }

    /// Failure code of the latest `AUTH_ERROR`, if any arrived.
    pub fn last_auth_error(&self) -> Option<ErrorCode> {
        self.received.iter().rev().find_map(|message| match message {
            OutboundMessage::AuthError { code, .. } => Some(*code),
            _ => None,
        })
    }
}
