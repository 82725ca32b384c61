#![forbid(unsafe_code)]

//! One-shot timers on a virtual or real clock.
//!
//! [`TimerQueue`] holds the callbacks produced by [`Cmd::After`]. Runners
//! pop due timers in `(deadline, insertion)` order, so two timers with the
//! same deadline fire in the order they were scheduled.
//!
//! # Invariants
//!
//! 1. A timer fires at most once; cancelled timers never fire.
//! 2. Deadlines are absolute on the runner's monotonic clock.
//! 3. Draining never fires a timer whose deadline is after `until`.
//!
//! [`Cmd::After`]: crate::program::Cmd::After

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::program::TimerCallback;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Clock readings at the moment a timer expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    /// Monotonic time the timer fired at.
    pub mono: Duration,
    /// Local wall-clock time the timer fired at.
    pub wall: NaiveDateTime,
}

struct Entry<M> {
    id: TimerId,
    deadline: Duration,
    callback: TimerCallback<M>,
}

/// A timer whose deadline has passed, ready to be fired.
pub struct DueTimer<M> {
    id: TimerId,
    deadline: Duration,
    callback: TimerCallback<M>,
}

impl<M> DueTimer<M> {
    /// The timer's handle.
    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// The timer's absolute deadline.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run the callback, producing the message to dispatch.
    pub fn fire(self, fired: Fired) -> M {
        (self.callback)(fired)
    }
}

impl<M> fmt::Debug for DueTimer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DueTimer")
            .field("id", &self.id)
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// Pending one-shot timers.
pub struct TimerQueue<M> {
    // Kept sorted by (deadline, id); ids are allocated monotonically.
    entries: Vec<Entry<M>>,
    next_id: u64,
}

impl<M> Default for TimerQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> TimerQueue<M> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `callback` to fire `delay` after `now`.
    pub fn schedule(
        &mut self,
        now: Duration,
        delay: Duration,
        callback: TimerCallback<M>,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = now.saturating_add(delay);
        let pos = self
            .entries
            .partition_point(|e| (e.deadline, e.id) <= (deadline, id));
        self.entries.insert(
            pos,
            Entry {
                id,
                deadline,
                callback,
            },
        );
        tracing::trace!(
            timer = id.0,
            deadline_ms = deadline.as_millis() as u64,
            "timer scheduled"
        );
        id
    }

    /// Cancel a pending timer.
    ///
    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                tracing::trace!(timer = id.0, "timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.first().map(|e| e.deadline)
    }

    /// Remove and return the earliest timer if its deadline is `<= until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<DueTimer<M>> {
        if self.entries.first()?.deadline > until {
            return None;
        }
        let Entry {
            id,
            deadline,
            callback,
        } = self.entries.remove(0);
        Some(DueTimer {
            id,
            deadline,
            callback,
        })
    }

    /// Remove every timer due by `until`, in firing order.
    pub fn drain_due(&mut self, until: Duration) -> Vec<DueTimer<M>> {
        let mut due = Vec::new();
        while let Some(timer) = self.pop_due(until) {
            due.push(timer);
        }
        due
    }

    /// Whether a timer is still pending.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending timer, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }
}

impl<M> fmt::Debug for TimerQueue<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.entries.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}
