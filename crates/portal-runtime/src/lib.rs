#![forbid(unsafe_code)]

//! Portal Runtime
//!
//! This crate ties the core and render crates together into an Elm-style
//! workflow engine for static pages.
//!
//! # Key Components
//!
//! - [`Model`] - Trait for application state and behavior
//! - [`Cmd`] - Commands for side effects (timers, alerts, saves, resets)
//! - [`TimerQueue`] - One-shot timers ordered by deadline
//! - [`ProgramSimulator`] - Deterministic runner on a virtual clock
//! - [`PreferenceStore`] - Persisted display preferences
//!
//! # How it fits in the system
//! The runtime is the bridge between host events (`portal-core`) and page
//! output (`portal-render`). Runners in `portal-web` drive the same
//! [`Model`] against a live document.

pub mod preference_store;
pub mod program;
pub mod simulator;
pub mod timer;

pub use preference_store::{
    MemoryStorage, PreferenceStore, StorageBackend, StorageError, StorageResult, StoreStats,
};
#[cfg(feature = "persistence")]
pub use preference_store::FileStorage;
pub use program::{Cmd, Model, TimerCallback};
pub use simulator::{CmdRecord, ProgramSimulator};
pub use timer::{DueTimer, Fired, TimerId, TimerQueue};
