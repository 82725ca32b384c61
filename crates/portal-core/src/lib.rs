#![forbid(unsafe_code)]

//! Core: page events, element ids, clocks, synthetic artifacts, and logging.

pub mod artifact;
pub mod clock;
pub mod element;
pub mod event;
pub mod logging;

#[cfg(feature = "tracing")]
pub use logging::{debug, trace_span};
