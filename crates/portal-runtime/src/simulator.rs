#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a browser, on a virtual
//! clock, enabling deterministic page snapshots, event injection, and
//! inspection of every side effect the model requested.
//!
//! # Example
//!
//! ```ignore
//! use portal_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(Site::default(), site_markup());
//! sim.init();
//! sim.inject_event(Event::click_with("download-report", "report"));
//! sim.advance_time(Duration::from_millis(1500));
//! assert_eq!(sim.saved()[0].filename, "report.txt");
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use portal_core::artifact::Artifact;
use portal_core::clock::{Clock, DeterministicClock};
use portal_core::element::ElementId;
use portal_core::event::Event;
use portal_render::{Page, PageMarkup};

use crate::preference_store::PreferenceStore;
use crate::program::{Cmd, Model};
use crate::timer::{Fired, TimerQueue};

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    /// No-op command.
    None,
    /// Quit command.
    Quit,
    /// Message sent to model (not stored, just noted).
    Msg,
    /// Batch of commands.
    Batch(usize),
    /// Sequence of commands.
    Sequence(usize),
    /// Timer scheduled with the given delay.
    After(Duration),
    /// Timer fired at the given virtual time.
    TimerFired(Duration),
    /// Log message emitted.
    Log(String),
    /// Blocking notice shown.
    Alert(String),
    /// Artifact handed off, by filename.
    Save(String),
    /// Form reset.
    ResetForm(ElementId),
    /// Preference store flushed.
    SaveState,
    /// Preference store reloaded.
    RestoreState,
}

/// Deterministic simulator for [`Model`] testing.
///
/// Time only moves through [`advance_time`](Self::advance_time); timers fire
/// exactly at their deadlines, in deadline order.
pub struct ProgramSimulator<M: Model> {
    /// The application model.
    model: M,
    /// Markup each capture instantiates from.
    markup: PageMarkup,
    /// Virtual clock.
    clock: DeterministicClock,
    /// Pending one-shot timers.
    timers: TimerQueue<M::Message>,
    /// Captured pages.
    pages: Vec<Page>,
    /// Record of all executed commands.
    command_log: Vec<CmdRecord>,
    /// Whether the simulated view is still live.
    running: bool,
    /// Log messages emitted via `Cmd::Log`.
    logs: Vec<String>,
    /// Blocking notices emitted via `Cmd::Alert`.
    alerts: Vec<String>,
    /// Artifacts handed off via `Cmd::Save`.
    saved: Vec<Artifact>,
    /// Forms reset via `Cmd::ResetForm`.
    form_resets: Vec<ElementId>,
    /// Optional preference store for persistence integration.
    preferences: Option<Arc<PreferenceStore>>,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a new simulator with the given model and page markup.
    ///
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M, markup: PageMarkup) -> Self {
        Self {
            model,
            markup,
            clock: DeterministicClock::new(),
            timers: TimerQueue::new(),
            pages: Vec::new(),
            command_log: Vec::new(),
            running: true,
            logs: Vec::new(),
            alerts: Vec::new(),
            saved: Vec::new(),
            form_resets: Vec::new(),
            preferences: None,
        }
    }

    /// Create a simulator whose `SaveState`/`RestoreState` go through `store`.
    pub fn with_registry(model: M, markup: PageMarkup, store: Arc<PreferenceStore>) -> Self {
        let mut sim = Self::new(model, markup);
        sim.preferences = Some(store);
        sim
    }

    /// Builder: start the virtual wall clock at `epoch`.
    #[must_use]
    pub fn with_epoch(mut self, epoch: NaiveDateTime) -> Self {
        self.clock = self.clock.with_epoch(epoch);
        self
    }

    /// Initialize the model by calling `Model::init()` and executing returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Inject host events into the model, in order.
    ///
    /// Each event is converted to a message via `From<Event>` and dispatched
    /// through `Model::update()`. Events after a quit are dropped.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let msg = M::Message::from(event.clone());
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
    }

    /// Inject a single host event into the model.
    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Send a specific message to the model.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Move virtual time forward by `dt`, firing every timer due on the way.
    ///
    /// Returns the number of timers fired. Timers scheduled by a firing
    /// callback also fire if they fall inside the window.
    pub fn advance_time(&mut self, dt: Duration) -> usize {
        let target = self.clock.now_mono().saturating_add(dt);
        let mut fired = 0;
        while self.running {
            let Some(due) = self.timers.pop_due(target) else {
                break;
            };
            let deadline = due.deadline();
            self.clock.set(deadline);
            self.command_log.push(CmdRecord::TimerFired(deadline));
            let msg = due.fire(Fired {
                mono: deadline,
                wall: self.clock.now_wall(),
            });
            fired += 1;
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
        self.clock.set(target);
        fired
    }

    /// Current virtual monotonic time.
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    /// Number of timers still pending.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Render the current state into a fresh page and store it.
    pub fn capture_page(&mut self) -> &Page {
        let mut page = self.markup.instantiate();
        self.model.view(&mut page);
        self.pages.push(page);
        &self.pages[self.pages.len() - 1]
    }

    /// Get all captured pages.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Get the most recently captured page, if any.
    pub fn last_page(&self) -> Option<&Page> {
        self.pages.last()
    }

    /// Get a reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Returns `false` after a `Cmd::Quit` has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Log messages emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Blocking notices emitted via `Cmd::Alert`.
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Artifacts handed off via `Cmd::Save`.
    pub fn saved(&self) -> &[Artifact] {
        &self.saved
    }

    /// Forms reset via `Cmd::ResetForm`.
    pub fn form_resets(&self) -> &[ElementId] {
        &self.form_resets
    }

    /// Get the command execution log.
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    /// Clear all captured pages.
    pub fn clear_pages(&mut self) {
        self.pages.clear();
    }

    /// Clear all logs.
    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {
                self.command_log.push(CmdRecord::None);
            }
            Cmd::Quit => {
                self.running = false;
                self.timers.clear();
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Sequence(cmds) => {
                self.command_log.push(CmdRecord::Sequence(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::After(delay, callback) => {
                self.command_log.push(CmdRecord::After(delay));
                self.timers.schedule(self.clock.now_mono(), delay, callback);
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
            Cmd::Alert(text) => {
                self.command_log.push(CmdRecord::Alert(text.clone()));
                self.alerts.push(text);
            }
            Cmd::Save(artifact) => {
                self.command_log
                    .push(CmdRecord::Save(artifact.filename.clone()));
                self.saved.push(artifact);
            }
            Cmd::ResetForm(form) => {
                self.command_log.push(CmdRecord::ResetForm(form.clone()));
                self.form_resets.push(form);
            }
            Cmd::SaveState => {
                self.command_log.push(CmdRecord::SaveState);
                if let Some(store) = &self.preferences
                    && let Err(err) = store.flush()
                {
                    tracing::warn!(error = %err, "preference flush failed");
                }
            }
            Cmd::RestoreState => {
                self.command_log.push(CmdRecord::RestoreState);
                if let Some(store) = &self.preferences
                    && let Err(err) = store.load()
                {
                    tracing::warn!(error = %err, "preference load failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_render::Node;

    const LABEL: ElementId = ElementId::from_static("label");

    // ---------- Test model ----------

    #[derive(Default)]
    struct Beeper {
        beeps: u32,
        fired_at: Vec<Duration>,
        initialized: bool,
    }

    #[derive(Debug)]
    enum BeepMsg {
        Beep,
        ArmIn(u64),
        Rang(Duration),
        Chain,
        Quit,
        Ignored,
    }

    impl From<Event> for BeepMsg {
        fn from(event: Event) -> Self {
            match event {
                Event::Click(c) if c.target == "beep" => BeepMsg::Beep,
                Event::Unload => BeepMsg::Quit,
                _ => BeepMsg::Ignored,
            }
        }
    }

    impl Model for Beeper {
        type Message = BeepMsg;

        fn init(&mut self) -> Cmd<Self::Message> {
            self.initialized = true;
            Cmd::log("ready")
        }

        fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
            match msg {
                BeepMsg::Beep => {
                    self.beeps += 1;
                    Cmd::alert(format!("beep {}", self.beeps))
                }
                BeepMsg::ArmIn(ms) => {
                    Cmd::after(Duration::from_millis(ms), |f| BeepMsg::Rang(f.mono))
                }
                BeepMsg::Rang(at) => {
                    self.fired_at.push(at);
                    Cmd::none()
                }
                BeepMsg::Chain => Cmd::after(Duration::from_millis(10), |_| BeepMsg::ArmIn(10)),
                BeepMsg::Quit => Cmd::quit(),
                BeepMsg::Ignored => Cmd::none(),
            }
        }

        fn view(&self, page: &mut Page) {
            page.update(&LABEL, |n| n.set_text(format!("{} beeps", self.beeps)));
        }
    }

    fn markup() -> PageMarkup {
        PageMarkup::new().with(LABEL, Node::new())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn init_runs_startup_commands() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.init();
        assert!(sim.model().initialized);
        assert_eq!(sim.logs(), &["ready".to_string()]);
    }

    #[test]
    fn events_reach_update_and_view() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.inject_events(&[Event::click("beep"), Event::click("beep")]);
        assert_eq!(sim.alerts(), &["beep 1".to_string(), "beep 2".to_string()]);
        let page = sim.capture_page();
        assert_eq!(page.text(&LABEL), Some("2 beeps"));
    }

    #[test]
    fn timers_fire_at_their_deadline() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.send(BeepMsg::ArmIn(1500));
        assert_eq!(sim.advance_time(ms(1499)), 0);
        assert_eq!(sim.advance_time(ms(1)), 1);
        assert_eq!(sim.model().fired_at, vec![ms(1500)]);
        assert_eq!(sim.now(), ms(1500));
    }

    #[test]
    fn timers_fire_in_deadline_order_within_one_advance() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.send(BeepMsg::ArmIn(300));
        sim.send(BeepMsg::ArmIn(100));
        sim.advance_time(ms(1000));
        assert_eq!(sim.model().fired_at, vec![ms(100), ms(300)]);
        assert_eq!(sim.now(), ms(1000));
    }

    #[test]
    fn chained_timers_fire_inside_window() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.send(BeepMsg::Chain);
        assert_eq!(sim.advance_time(ms(25)), 2);
        assert_eq!(sim.model().fired_at, vec![ms(20)]);
    }

    #[test]
    fn quit_drops_pending_timers() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.send(BeepMsg::ArmIn(1500));
        assert_eq!(sim.pending_timers(), 1);
        sim.inject_event(Event::Unload);
        assert!(!sim.is_running());
        assert_eq!(sim.pending_timers(), 0);
        assert_eq!(sim.advance_time(ms(5000)), 0);
        assert!(sim.model().fired_at.is_empty());
    }

    #[test]
    fn events_after_quit_are_dropped() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.inject_events(&[Event::Unload, Event::click("beep")]);
        assert_eq!(sim.model().beeps, 0);
        sim.send(BeepMsg::Beep);
        assert_eq!(sim.model().beeps, 0);
    }

    #[test]
    fn command_log_records_in_order() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.init();
        sim.send(BeepMsg::ArmIn(5));
        sim.advance_time(ms(5));
        assert_eq!(
            sim.command_log(),
            &[
                CmdRecord::Log("ready".into()),
                CmdRecord::After(ms(5)),
                CmdRecord::TimerFired(ms(5)),
                CmdRecord::None,
            ]
        );
    }

    #[test]
    fn identical_inputs_yield_identical_outputs() {
        fn run() -> (Vec<Duration>, Vec<String>) {
            let mut sim = ProgramSimulator::new(Beeper::default(), markup());
            sim.init();
            sim.inject_event(Event::click("beep"));
            sim.send(BeepMsg::ArmIn(40));
            sim.send(BeepMsg::Chain);
            sim.advance_time(ms(100));
            (sim.model().fired_at.clone(), sim.alerts().to_vec())
        }
        assert_eq!(run(), run());
    }

    #[test]
    fn save_restore_go_through_store() {
        let store = PreferenceStore::in_memory().shared();
        let mut sim = ProgramSimulator::with_registry(Beeper::default(), markup(), store.clone());
        store.set("theme", "dark");
        assert!(store.is_dirty());
        sim.execute_cmd(Cmd::save_state());
        assert!(!store.is_dirty());
        sim.execute_cmd(Cmd::restore_state());
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn save_restore_without_store_are_recorded_noops() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.execute_cmd(Cmd::Batch(vec![Cmd::save_state(), Cmd::restore_state()]));
        assert_eq!(
            sim.command_log(),
            &[
                CmdRecord::Batch(2),
                CmdRecord::SaveState,
                CmdRecord::RestoreState
            ]
        );
    }

    #[test]
    fn saved_artifacts_and_resets_are_recorded() {
        let mut sim = ProgramSimulator::new(Beeper::default(), markup());
        sim.execute_cmd(Cmd::Sequence(vec![
            Cmd::save(Artifact::text("a.txt", "x")),
            Cmd::reset_form(ElementId::new("result-form")),
        ]));
        assert_eq!(sim.saved()[0].filename, "a.txt");
        assert_eq!(sim.form_resets(), &[ElementId::new("result-form")]);
    }

    #[test]
    fn fired_wall_time_tracks_epoch() {
        use chrono::NaiveDate;

        struct Stamp(Vec<NaiveDateTime>);
        enum StampMsg {
            Arm,
            At(NaiveDateTime),
        }
        impl From<Event> for StampMsg {
            fn from(_: Event) -> Self {
                StampMsg::Arm
            }
        }
        impl Model for Stamp {
            type Message = StampMsg;
            fn update(&mut self, msg: StampMsg) -> Cmd<StampMsg> {
                match msg {
                    StampMsg::Arm => Cmd::after(ms(1500), |f| StampMsg::At(f.wall)),
                    StampMsg::At(t) => {
                        self.0.push(t);
                        Cmd::none()
                    }
                }
            }
            fn view(&self, _page: &mut Page) {}
        }

        let epoch = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap();
        let mut sim = ProgramSimulator::new(Stamp(Vec::new()), PageMarkup::new()).with_epoch(epoch);
        sim.send(StampMsg::Arm);
        sim.advance_time(ms(2000));
        assert_eq!(
            sim.model().0,
            vec![epoch + chrono::TimeDelta::milliseconds(1500)]
        );
    }
}
