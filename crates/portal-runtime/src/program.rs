#![forbid(unsafe_code)]

//! Elm-style model/command contract.
//!
//! A [`Model`] owns all workflow state. Host events are converted to the
//! model's message type, dispatched through [`Model::update`], and the
//! returned [`Cmd`] describes side effects for the runner to execute. Views
//! are pure projections of state onto a [`Page`].
//!
//! # Example
//!
//! ```ignore
//! use portal_core::event::Event;
//! use portal_render::Page;
//! use portal_runtime::program::{Cmd, Model};
//!
//! struct Counter {
//!     clicks: u32,
//! }
//!
//! enum Msg {
//!     Clicked,
//!     Ignored,
//! }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Click(_) => Msg::Clicked,
//!             _ => Msg::Ignored,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         if let Msg::Clicked = msg {
//!             self.clicks += 1;
//!         }
//!         Cmd::none()
//!     }
//!
//!     fn view(&self, page: &mut Page) {
//!         // Project state onto the page anchors
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

use portal_core::artifact::Artifact;
use portal_core::element::ElementId;
use portal_core::event::Event;
use portal_render::Page;

use crate::timer::Fired;

/// The Model trait defines application state and behavior.
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Must be convertible from host events.
    type Message: From<Event> + 'static;

    /// Initialize the model with startup commands.
    ///
    /// Called once when the view is created.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    ///
    /// This is the core state transition function. It runs to completion
    /// before the next event is taken.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Project the current state onto the page.
    ///
    /// `page` is freshly instantiated from the markup on every render, so
    /// views describe absolute state.
    fn view(&self, page: &mut Page);
}

/// Callback producing a message when a timer expires.
pub type TimerCallback<M> = Box<dyn FnOnce(Fired) -> M>;

/// Commands represent side effects to be executed by the runtime.
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Tear down the view. Pending timers are dropped.
    Quit,
    /// Execute multiple commands as a batch (currently sequential).
    Batch(Vec<Cmd<M>>),
    /// Execute commands sequentially.
    Sequence(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Deliver a message once `Duration` has elapsed on the runner's clock.
    ///
    /// The callback receives the clock readings at expiry.
    After(Duration, TimerCallback<M>),
    /// Write a diagnostic line to the host console.
    Log(String),
    /// Show a synchronous blocking notice (`window.alert`).
    Alert(String),
    /// Hand an artifact to the platform's save-to-disk mechanism.
    Save(Artifact),
    /// Reset every control of a form to its markup default.
    ResetForm(ElementId),
    /// Flush the preference store to its backend.
    ///
    /// No-op if no store is attached to the runner.
    SaveState,
    /// Reload the preference store from its backend.
    ///
    /// No-op if no store is attached to the runner.
    RestoreState,
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: fmt::Debug> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::After(d, _) => f.debug_tuple("After").field(d).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Alert(s) => f.debug_tuple("Alert").field(s).finish(),
            Self::Save(a) => f.debug_tuple("Save").field(&a.filename).finish(),
            Self::ResetForm(id) => f.debug_tuple("ResetForm").field(id).finish(),
            Self::SaveState => write!(f, "SaveState"),
            Self::RestoreState => write!(f, "RestoreState"),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a log command.
    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a blocking-notice command.
    #[inline]
    pub fn alert(text: impl Into<String>) -> Self {
        Self::Alert(text.into())
    }

    /// Create a save hand-off command.
    #[inline]
    pub fn save(artifact: Artifact) -> Self {
        Self::Save(artifact)
    }

    /// Create a form reset command.
    #[inline]
    pub fn reset_form(form: ElementId) -> Self {
        Self::ResetForm(form)
    }

    /// Create a one-shot timer command.
    pub fn after<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce(Fired) -> M + 'static,
    {
        Self::After(delay, Box::new(f))
    }

    /// Create a batch of commands.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    /// Create a sequence of commands.
    pub fn sequence(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Sequence(cmds),
        }
    }

    /// Create a save state command.
    #[inline]
    pub fn save_state() -> Self {
        Self::SaveState
    }

    /// Create a restore state command.
    #[inline]
    pub fn restore_state() -> Self {
        Self::RestoreState
    }

    /// Whether this is the no-op command.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Return a stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::After(..) => "After",
            Self::Log(_) => "Log",
            Self::Alert(_) => "Alert",
            Self::Save(_) => "Save",
            Self::ResetForm(_) => "ResetForm",
            Self::SaveState => "SaveState",
            Self::RestoreState => "RestoreState",
        }
    }

    /// Count of leaf commands (batches and sequences are flattened).
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) | Self::Sequence(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }
}
