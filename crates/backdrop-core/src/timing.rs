//! Debounce and throttle scheduling policies.
//!
//! Both take the current [`Instant`] as an argument instead of reading the
//! clock, so callers drive them from their own loop and tests can replay
//! exact timelines.

use std::time::{Duration, Instant};

/// Emits the latest input once `delay` has passed without a newer input.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a new input, restarting the quiet window.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Return the settled value if the quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Instant at which the pending value will settle.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Lets one call through, then drops every call for `delay`.
#[derive(Debug, Clone)]
pub struct Throttle {
    delay: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    /// Whether a call at `now` would be let through.
    pub fn ready(&self, now: Instant) -> bool {
        self.last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.delay)
    }

    /// Invoke `f` unless suppressed. Suppressed calls are dropped, not queued.
    pub fn call<R>(&mut self, now: Instant, f: impl FnOnce() -> R) -> Option<R> {
        if !self.ready(now) {
            return None;
        }
        self.last = Some(now);
        Some(f())
    }
}
