#![forbid(unsafe_code)]

//! `portal-web` provides a WASM-friendly runner for portal pages.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) pushes DOM events.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate does not bind to `wasm-bindgen`. It captures everything the
//! host must do (DOM patches, blocking alerts, downloads, form resets) in
//! [`WebOutputs`], which a thin JS shim replays against the document.

pub mod step_program;

use std::collections::VecDeque;

use portal_core::element::ElementId;
use portal_core::event::Event;
use portal_render::DomPatch;

pub use step_program::{StepProgram, StepResult};

/// Web backend error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebBackendError {
    /// `init` was called on an initialized program.
    #[error("program already initialized")]
    AlreadyInitialized,
    /// `step` was called before `init`.
    #[error("program not initialized")]
    NotInitialized,
    /// Generic unsupported operation.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

/// Host-driven event queue.
///
/// The host pushes [`Event`] values; the runner drains them on each step.
#[derive(Debug, Clone, Default)]
pub struct WebEventSource {
    queue: VecDeque<Event>,
}

impl WebEventSource {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a canonical event into the queue.
    pub fn push_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Pop the oldest pending event.
    pub fn read_event(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// A file the host should save.
///
/// The host wraps `contents` in a `Blob` of type `mime`, creates an object URL
/// for it, clicks a temporary anchor carrying `filename`, and then revokes the
/// URL. The URL's whole lifetime stays on the host side of the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Download {
    /// Name the browser saves the file under.
    pub filename: String,
    /// MIME type of the blob.
    pub mime: &'static str,
    /// Blob contents.
    pub contents: String,
}

/// Captured outputs for host consumption.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WebOutputs {
    /// DOM patches accumulated since the last take, in application order.
    pub patches: Vec<DomPatch>,
    /// Whether `patches` starts with a full repaint.
    pub full_repaint: bool,
    /// Blocking notices (`window.alert`) to show, in order.
    pub alerts: Vec<String>,
    /// Save hand-offs, in order.
    pub downloads: Vec<Download>,
    /// Forms to reset, in order.
    pub form_resets: Vec<ElementId>,
    /// Log lines written by the runtime.
    pub logs: Vec<String>,
}

impl WebOutputs {
    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
            && self.alerts.is_empty()
            && self.downloads.is_empty()
            && self.form_resets.is_empty()
            && self.logs.is_empty()
    }

    /// Encode for the JS bridge.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
