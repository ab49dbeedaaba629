//! Two independent timers: a debounce for matching and a throttle for saves.
//!
//! Both are driven by timestamps passed in by the caller, so the owner
//! decides when to poll them and tests can step time by hand.

use jiff::{SignedDuration, Timestamp};

/// Holds the latest scheduled value until its delay has passed.
///
/// Scheduling again replaces the pending value and restarts the delay.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    pending: Option<(T, Timestamp)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Debouncer { pending: None }
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, value: T, delay: SignedDuration, now: Timestamp) {
        let due = now.checked_add(delay).unwrap_or(now);
        self.pending = Some((value, due));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn deadline(&self) -> Option<Timestamp> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Hand back the pending value if its deadline is reached.
    pub fn take_due(&mut self, now: Timestamp) -> Option<T> {
        if self.deadline().is_some_and(|due| due <= now) {
            self.cancel()
        } else {
            None
        }
    }
}

/// Limits writes to one per interval; a write refused now stays owed.
#[derive(Debug, Clone)]
pub struct SaveThrottle {
    interval: SignedDuration,
    last_write: Option<Timestamp>,
    dirty: bool,
}

impl SaveThrottle {
    pub fn new(interval: SignedDuration) -> Self {
        SaveThrottle {
            interval,
            last_write: None,
            dirty: false,
        }
    }

    /// Ask to write. `true` means write now; otherwise the write is owed.
    pub fn request(&mut self, now: Timestamp) -> bool {
        if self.window_open(now) {
            self.mark_written(now);
            true
        } else {
            self.dirty = true;
            false
        }
    }

    /// An owed write whose interval has elapsed.
    pub fn due(&self, now: Timestamp) -> bool {
        self.dirty && self.window_open(now)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_written(&mut self, now: Timestamp) {
        self.last_write = Some(now);
        self.dirty = false;
    }

    fn window_open(&self, now: Timestamp) -> bool {
        match self.last_write {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        }
    }
}
