//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`). Only compiled for tests or with the `test-support`
//! feature.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{MessageSink, MessageSinkError};
use crate::protocol::OutboundMessage;

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock frozen at 2026-09-01T08:00:00Z.
    pub fn fixed() -> Self {
        Self::new(fixed_instant())
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// The instant [`MutableClock::fixed`] starts at.
pub fn fixed_instant() -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339("2026-09-01T08:00:00Z") {
        Ok(instant) => instant.with_timezone(&Utc),
        Err(error) => panic!("fixture timestamp: {error}"),
    }
}

/// Sink that keeps every posted message in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    messages: Vec<OutboundMessage>,
}

impl RecordingSink {
    /// Messages posted so far.
    pub fn messages(&self) -> &[OutboundMessage] {
        &self.messages
    }

    /// Take the recorded messages, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Wire type names of the recorded messages.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.messages.iter().map(OutboundMessage::type_name).collect()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn post(&mut self, message: OutboundMessage) -> Result<(), MessageSinkError> {
        self.messages.push(message);
        Ok(())
    }
}
