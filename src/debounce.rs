//! # Debounce
//!
//! Values that only settle after their input has been stable for a delay.
//!
//! There are no threads or real timers here. The owner passes a logical
//! `Instant` into every call and polls from its event loop; a pending update
//! is plain data, so cancelling (or dropping the owner) guarantees it never
//! fires.

use std::time::{Duration, Instant};

/// A debounced value.
///
/// Each new input replaces any pending update and restarts the delay. With a
/// zero delay, inputs settle immediately.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    value: T,
    pending: Option<Pending<T>>,
    delay: Duration,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T: Clone + PartialEq> Debounced<T> {
    /// Create a debounced value that starts settled at `initial`.
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            value: initial,
            pending: None,
            delay,
        }
    }

    /// The settled value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// The most recent input, settled or not.
    pub fn latest(&self) -> &T {
        self.pending
            .as_ref()
            .map(|p| &p.value)
            .unwrap_or(&self.value)
    }

    /// Current delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Feed a new input at time `now`.
    ///
    /// Returns `true` if the settled value changed as a direct result (only
    /// possible with a zero delay). Re-sending the latest input is a no-op and
    /// does not restart the delay.
    pub fn set(&mut self, value: T, now: Instant) -> bool {
        if *self.latest() == value {
            return false;
        }
        self.schedule(value, now)
    }

    /// Change the delay at time `now`.
    ///
    /// A pending update is rescheduled against the new delay, so switching to
    /// zero settles it immediately. Returns `true` if the settled value changed.
    pub fn set_delay(&mut self, delay: Duration, now: Instant) -> bool {
        if delay == self.delay {
            return false;
        }
        self.delay = delay;
        match self.pending.take() {
            Some(pending) => self.schedule(pending.value, now),
            None => false,
        }
    }

    /// Settle the pending update if its deadline has passed.
    ///
    /// Returns `true` if the settled value changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending.take() {
            Some(pending) if now >= pending.deadline => self.settle(pending.value),
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// When the pending update is due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Whether an update is waiting to settle.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending update without settling it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    fn schedule(&mut self, value: T, now: Instant) -> bool {
        if self.delay.is_zero() {
            self.pending = None;
            return self.settle(value);
        }
        self.pending = Some(Pending {
            value,
            deadline: now + self.delay,
        });
        false
    }

    fn settle(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }
}

/// A cancellable one-shot timer.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` after `now`, replacing any earlier arming.
    pub fn start(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
