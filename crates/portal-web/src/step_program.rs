#![forbid(unsafe_code)]

//! Step-based page runner.
//!
//! [`StepProgram`] drives a [`portal_runtime::Model`] through
//! init / event / update / view / diff cycles without threads or blocking.
//! The host (JavaScript) controls the event loop:
//!
//! 1. Push DOM events via [`StepProgram::push_event`].
//! 2. Advance time via [`StepProgram::advance_time`].
//! 3. Call [`StepProgram::step`] to process events, fire due timers, and render.
//! 4. Replay [`StepProgram::take_outputs`] against the document.
//!
//! # Example
//!
//! ```ignore
//! use portal_web::StepProgram;
//! use portal_core::event::Event;
//! use core::time::Duration;
//!
//! let mut prog = StepProgram::new(PortalApp::default(), site_markup());
//! prog.init()?;
//!
//! // Host-driven loop
//! prog.push_event(Event::click_with("download-report", "report"));
//! prog.advance_time(Duration::from_millis(16));
//! let result = prog.step()?;
//!
//! let outputs = prog.take_outputs();
//! // Apply outputs.patches, show outputs.alerts, click outputs.downloads...
//! ```

use core::time::Duration;
use std::sync::Arc;

use chrono::NaiveDateTime;
use portal_core::clock::{Clock, DeterministicClock, SystemClock};
use portal_core::event::Event;
use portal_render::{Page, PageDiff, PageMarkup};
use portal_runtime::{Cmd, Fired, Model, PreferenceStore, TimerQueue};

use crate::{Download, WebBackendError, WebEventSource, WebOutputs};

/// Result of a single [`StepProgram::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the program is still running (false after `Cmd::Quit`).
    pub running: bool,
    /// Whether a frame was rendered during this step.
    pub rendered: bool,
    /// Number of events processed during this step.
    pub events_processed: u32,
    /// Number of timers fired during this step.
    pub timers_fired: u32,
    /// Current frame index (monotonically increasing).
    pub frame_idx: u64,
}

/// Host-driven, non-blocking page runner.
///
/// # Lifecycle
///
/// 1. [`StepProgram::new`]: Create with model and the page's markup.
/// 2. [`StepProgram::init`]: Call once to initialize the model and paint the first frame.
/// 3. [`StepProgram::step`]: Call from the host whenever events or time arrive.
/// 4. Read outputs after each step via [`StepProgram::take_outputs`].
pub struct StepProgram<M: Model> {
    model: M,
    markup: PageMarkup,
    clock: DeterministicClock,
    events: WebEventSource,
    timers: TimerQueue<M::Message>,
    outputs: WebOutputs,
    preferences: Option<Arc<PreferenceStore>>,
    running: bool,
    initialized: bool,
    dirty: bool,
    frame_idx: u64,
    prev_page: Option<Page>,
}

impl<M: Model> StepProgram<M> {
    /// Create a new step program for `model` bound to `markup`.
    ///
    /// Monotonic time starts at zero and only moves when the host advances it.
    /// Wall-clock stamps start from the system's local time at construction.
    #[must_use]
    pub fn new(model: M, markup: PageMarkup) -> Self {
        Self {
            model,
            markup,
            clock: DeterministicClock::anchored_to(&SystemClock::new()),
            events: WebEventSource::new(),
            timers: TimerQueue::new(),
            outputs: WebOutputs::default(),
            preferences: None,
            running: true,
            initialized: false,
            dirty: true,
            frame_idx: 0,
            prev_page: None,
        }
    }

    /// Builder: override the wall-clock reading at monotonic zero.
    #[must_use]
    pub fn with_epoch(mut self, epoch: NaiveDateTime) -> Self {
        self.clock = self.clock.with_epoch(epoch);
        self
    }

    /// Builder: route `SaveState`/`RestoreState` through `store`.
    #[must_use]
    pub fn with_preferences(mut self, store: Arc<PreferenceStore>) -> Self {
        self.preferences = Some(store);
        self
    }

    /// Initialize the model and render the first frame.
    ///
    /// Must be called exactly once before [`step`](Self::step).
    pub fn init(&mut self) -> Result<(), WebBackendError> {
        if self.initialized {
            return Err(WebBackendError::AlreadyInitialized);
        }
        self.initialized = true;
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        if self.running {
            self.render_frame();
        }
        Ok(())
    }

    /// Process pending events, fire due timers, and render if dirty.
    pub fn step(&mut self) -> Result<StepResult, WebBackendError> {
        if !self.initialized {
            return Err(WebBackendError::NotInitialized);
        }

        if !self.running {
            return Ok(StepResult {
                running: false,
                rendered: false,
                events_processed: 0,
                timers_fired: 0,
                frame_idx: self.frame_idx,
            });
        }

        // 1. Process all pending events.
        let mut events_processed: u32 = 0;
        while let Some(event) = self.events.read_event() {
            events_processed += 1;
            self.handle_event(event);
            if !self.running {
                break;
            }
        }

        // 2. Fire timers that are due at the current time.
        let mut timers_fired: u32 = 0;
        let now = self.clock.now_mono();
        while self.running {
            let Some(due) = self.timers.pop_due(now) else {
                break;
            };
            timers_fired += 1;
            let msg = due.fire(Fired {
                mono: now,
                wall: self.clock.now_wall(),
            });
            let cmd = self.model.update(msg);
            self.dirty = true;
            self.execute_cmd(cmd);
        }

        // 3. Render if dirty.
        let rendered = if self.running && self.dirty {
            self.render_frame();
            true
        } else {
            false
        };

        Ok(StepResult {
            running: self.running,
            rendered,
            events_processed,
            timers_fired,
            frame_idx: self.frame_idx,
        })
    }

    /// Push a DOM event into the event queue.
    ///
    /// Events are processed on the next [`step`](Self::step) call.
    pub fn push_event(&mut self, event: Event) {
        self.events.push_event(event);
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Current monotonic time.
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    /// Current wall-clock time, as stamped on fired timers.
    pub fn now_wall(&self) -> NaiveDateTime {
        self.clock.now_wall()
    }

    /// Earliest pending timer deadline, so the host can schedule its next wake-up.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Take the captured outputs, leaving empty defaults.
    pub fn take_outputs(&mut self) -> WebOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Read the captured outputs without consuming them.
    pub fn outputs(&self) -> &WebOutputs {
        &self.outputs
    }

    /// Access the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutably access the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// The page as of the last render.
    pub fn page(&self) -> Option<&Page> {
        self.prev_page.as_ref()
    }

    /// Whether the program is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the program has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current frame index.
    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    // --- Private helpers ---

    fn handle_event(&mut self, event: Event) {
        let msg = M::Message::from(event);
        let cmd = self.model.update(msg);
        self.dirty = true;
        self.execute_cmd(cmd);
    }

    fn render_frame(&mut self) {
        let mut page = self.markup.instantiate();
        self.model.view(&mut page);

        let diff = match &self.prev_page {
            Some(prev) => PageDiff::compute(prev, &page),
            None => {
                self.outputs.full_repaint = true;
                PageDiff::full(&page)
            }
        };
        tracing::trace!(
            frame = self.frame_idx,
            patches = diff.len(),
            "frame rendered"
        );
        self.outputs.patches.extend(diff.into_patches());
        self.prev_page = Some(page);

        self.dirty = false;
        self.frame_idx += 1;
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                self.running = false;
                let dropped = self.timers.clear();
                if dropped > 0 {
                    tracing::debug!(dropped, "view torn down with pending timers");
                }
            }
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::After(delay, callback) => {
                self.timers.schedule(self.clock.now_mono(), delay, callback);
            }
            Cmd::Log(text) => {
                self.outputs.logs.push(text);
            }
            Cmd::Alert(text) => {
                self.outputs.alerts.push(text);
            }
            Cmd::Save(artifact) => {
                tracing::debug!(filename = %artifact.filename, "download handed to host");
                self.outputs.downloads.push(Download {
                    filename: artifact.filename,
                    mime: artifact.mime,
                    contents: artifact.contents,
                });
            }
            Cmd::ResetForm(form) => {
                self.outputs.form_resets.push(form);
            }
            Cmd::SaveState => {
                if let Some(store) = &self.preferences
                    && let Err(err) = store.flush()
                {
                    tracing::warn!(error = %err, "preference flush failed");
                }
            }
            Cmd::RestoreState => {
                if let Some(store) = &self.preferences
                    && let Err(err) = store.load()
                {
                    tracing::warn!(error = %err, "preference load failed");
                }
            }
        }
    }
}
