#![forbid(unsafe_code)]

//! Logging facade for the render and widget crates.
//!
//! Those crates log through `portal_core::debug!` and
//! `portal_core::trace_span!` so their `tracing` feature stays a single
//! switch. With the `tracing` feature on, both are the `tracing` macros.
//! With it off, `debug!` expands to nothing and `trace_span!` yields a
//! [`NoopSpan`] whose guard does nothing, so call sites compile unchanged.
//!
//! No crate in the workspace installs a subscriber. That is the host's call.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace_span};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Discards the event when tracing is compiled out.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Yields a [`NoopSpan`](crate::logging::NoopSpan) when tracing is compiled out.
    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in for `tracing::Span` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[must_use]
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan::enter`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;
