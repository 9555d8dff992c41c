//! Per-identity sliding-window attempt limiter.
//!
//! A process-local first line of defence against signup bursts. State lives
//! in memory only: it is lost on restart and not shared across replicas.
//! One instance is built per process and handed to every controller.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::debug;

/// Default trailing window.
pub const DEFAULT_WINDOW: TimeDelta = TimeDelta::minutes(15);
/// Default number of attempts allowed inside the window.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Window length and ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Trailing window attempts are counted in.
    pub window: TimeDelta,
    /// Attempts allowed inside the window.
    pub max_attempts: usize,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Rejection returned once an identity key has exhausted its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("too many attempts; retry in {} seconds", retry_after.num_seconds())]
pub struct RateLimited {
    /// Time until the oldest counted attempt leaves the window.
    pub retry_after: TimeDelta,
}

/// Sliding-window limiter keyed by identity key (lowercased email).
pub struct AttemptLimiter {
    clock: Arc<dyn Clock + Send + Sync>,
    policy: RateLimitPolicy,
    windows: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl AttemptLimiter {
    /// Build a limiter with an explicit clock and policy.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>, policy: RateLimitPolicy) -> Self {
        Self {
            clock,
            policy,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Active policy.
    #[must_use]
    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Allow and record an attempt, or reject without recording it.
    ///
    /// Attempts older than the window are pruned from the key's history
    /// before counting.
    pub fn check_and_record(&self, identity_key: &str) -> Result<(), RateLimited> {
        let now = self.clock.utc();
        let cutoff = now - self.policy.window;
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let attempts = windows.entry(identity_key.to_owned()).or_default();

        while attempts.front().is_some_and(|attempt| *attempt <= cutoff) {
            attempts.pop_front();
        }

        if attempts.len() >= self.policy.max_attempts {
            let retry_after = attempts
                .front()
                .map_or(self.policy.window, |oldest| *oldest + self.policy.window - now);
            debug!(
                attempts = attempts.len(),
                retry_after_secs = retry_after.num_seconds(),
                "attempt rejected by rate limiter"
            );
            return Err(RateLimited { retry_after });
        }

        attempts.push_back(now);
        Ok(())
    }

    /// Drop keys whose attempts have all left the window.
    pub fn purge_idle(&self) {
        let cutoff = self.clock.utc() - self.policy.window;
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.retain(|_, attempts| attempts.back().is_some_and(|latest| *latest > cutoff));
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
