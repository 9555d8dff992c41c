//! Test session surface.

use crate::domain::TestSummary;
use crate::protocol::{InboundMessage, OutboundMessage, SurfaceKind};

use super::Surface;

/// What the user can do while a test is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestSessionAction {
    /// Leave the test and return to the dashboard.
    Exit,
}

/// Rendered test header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSessionView {
    /// Test title; `None` until the test arrives.
    pub title: Option<String>,
    /// Number of questions.
    pub question_count: u16,
}

/// Test session surface state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSessionSurface {
    test: Option<TestSummary>,
}

impl Surface for TestSessionSurface {
    type Action = TestSessionAction;
    type View = TestSessionView;

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::TestSession
    }

    fn on_mount(&mut self) -> Vec<InboundMessage> {
        Vec::new()
    }

    fn dispatch(&mut self, action: TestSessionAction) -> Vec<InboundMessage> {
        match action {
            TestSessionAction::Exit => vec![InboundMessage::SwitchToDashboard],
        }
    }

    fn receive(&mut self, message: &OutboundMessage) {
        if let OutboundMessage::TestStarted { test } = message {
            self.test = Some(test.clone());
        }
    }

    fn render(&self) -> TestSessionView {
        TestSessionView {
            title: self.test.as_ref().map(|test| test.title.clone()),
            question_count: self.test.as_ref().map_or(0, |test| test.question_count),
        }
    }
}
