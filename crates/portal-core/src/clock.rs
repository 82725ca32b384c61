#![forbid(unsafe_code)]

//! Clock abstraction for time-based transitions.
//!
//! Every delay in the engine is measured against a [`Clock`]. Timers always
//! run on a [`DeterministicClock`], whose time only moves when it is advanced.
//! A host-driven runner anchors that clock to a [`SystemClock`] reading so
//! wall-clock stamps show the visitor's local time.

use core::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, Utc};
use web_time::Instant;

/// A source of monotonic and wall-clock time.
pub trait Clock {
    /// Monotonic time since the clock's origin.
    fn now_mono(&self) -> Duration;

    /// Local wall-clock time, used for human-readable stamps.
    fn now_wall(&self) -> NaiveDateTime;
}

/// Deterministic clock controlled by the host or a test.
///
/// Wall time is derived as `epoch + now_mono`, so two runs that advance the
/// clock identically produce identical timestamps.
#[derive(Debug, Clone)]
pub struct DeterministicClock {
    now: Duration,
    epoch: NaiveDateTime,
}

impl Default for DeterministicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicClock {
    /// Create a clock at `0` whose wall time starts at the Unix epoch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            epoch: DateTime::<Utc>::UNIX_EPOCH.naive_utc(),
        }
    }

    /// Create a clock at `0` whose wall time starts at `source`'s current reading.
    #[must_use]
    pub fn anchored_to(source: &impl Clock) -> Self {
        Self::new().with_epoch(source.now_wall())
    }

    /// Use `epoch` as the wall-clock reading at monotonic zero.
    #[must_use]
    pub fn with_epoch(mut self, epoch: NaiveDateTime) -> Self {
        self.epoch = epoch;
        self
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl Clock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }

    fn now_wall(&self) -> NaiveDateTime {
        TimeDelta::from_std(self.now)
            .ok()
            .and_then(|delta| self.epoch.checked_add_signed(delta))
            .unwrap_or(self.epoch)
    }
}

/// Real clock backed by the platform.
///
/// Uses `web_time::Instant`, which maps to `performance.now()` on
/// `wasm32-unknown-unknown` and to `std::time::Instant` elsewhere.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Create a clock whose monotonic origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }

    fn now_wall(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
