#![forbid(unsafe_code)]

//! The site application model.
//!
//! [`PortalApp`] owns every workflow for one loaded view: the results gate,
//! simulated downloads, display preferences, navigation highlight and tabs.
//! All user-facing notices go through a single [`Notifier`] chosen when the
//! view is built, so handlers never check which notification path exists.

use std::sync::Arc;

use chrono::NaiveDateTime;
use portal_core::element::ElementId;
use portal_core::event::{ClickEvent, Event};
use portal_render::{Page, PageMarkup};
use portal_runtime::{Cmd, Model, PreferenceStore};
use portal_widgets::{NavHighlight, Notifier, TabSet, Widget};

use crate::config::SiteConfig;
use crate::download::{ANNOUNCE_TITLE, Downloads, JobId};
use crate::gate::{CredentialInput, Gate, GateRules};
use crate::markup::{
    self, BACK_TO_LOGIN, DOWNLOAD_PREFIX, FONT_DECREASE, FONT_INCREASE, FONT_RESET,
    FONT_SELECTOR, GateIds, MODAL, NAV_PREFIX, RESULT_FORM, TAB_BUTTON_PREFIX, TAB_PANEL_CLASS,
    THEME_TOGGLE,
};
use crate::preferences::DisplayPrefs;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Site messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The credential form was submitted.
    Submit(CredentialInput),
    /// Return from the results view to the form.
    Reset,
    /// A download trigger was clicked.
    RequestDownload(String),
    /// A download's delay ran out.
    DownloadElapsed { job: JobId, at: NaiveDateTime },
    /// The overlay backdrop was clicked.
    DismissClicked,
    ToggleTheme,
    FontIncrease,
    FontDecrease,
    FontReset,
    /// The font selector changed to a family token.
    FontFamily(String),
    NavClicked { link: ElementId, href: String },
    TabClicked { button: ElementId, panel: ElementId },
    /// Stored preferences were reloaded.
    PreferencesRestored,
    /// The view is going away.
    Leave,
    Ignored,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Click(click) => Self::from_click(click),
            Event::Submit { form, fields } if form == RESULT_FORM => {
                Self::Submit(CredentialInput::from_form(&fields, &GateIds::default()))
            }
            Event::Change { target, value } if target == FONT_SELECTOR => Self::FontFamily(value),
            Event::Unload => Self::Leave,
            _ => Self::Ignored,
        }
    }
}

impl Msg {
    // Clicks inside the overlay report the content id, never the container,
    // so only backdrop clicks map to a dismiss.
    fn from_click(click: ClickEvent) -> Self {
        let ClickEvent { target, data } = click;
        if target == MODAL {
            return Self::DismissClicked;
        } else if target == BACK_TO_LOGIN {
            return Self::Reset;
        } else if target == THEME_TOGGLE {
            return Self::ToggleTheme;
        } else if target == FONT_INCREASE {
            return Self::FontIncrease;
        } else if target == FONT_DECREASE {
            return Self::FontDecrease;
        } else if target == FONT_RESET {
            return Self::FontReset;
        }
        if let Some(name) = target.strip_prefix(DOWNLOAD_PREFIX) {
            return Self::RequestDownload(data.unwrap_or_else(|| name.to_owned()));
        }
        if let Some(panel) = target.strip_prefix(TAB_BUTTON_PREFIX) {
            let panel = ElementId::new(data.unwrap_or_else(|| panel.to_owned()));
            return Self::TabClicked {
                button: target,
                panel,
            };
        }
        if let Some(name) = target.strip_prefix(NAV_PREFIX) {
            let href = data.unwrap_or_else(|| format!("#{name}"));
            return Self::NavClicked { link: target, href };
        }
        Self::Ignored
    }
}

// ---------------------------------------------------------------------------
// PortalApp
// ---------------------------------------------------------------------------

/// Application state for one loaded view.
pub struct PortalApp {
    config: SiteConfig,
    notifier: Notifier,
    gate: Gate,
    downloads: Downloads,
    prefs: DisplayPrefs,
    store: Arc<PreferenceStore>,
    nav: NavHighlight,
    tabs: TabSet,
}

impl PortalApp {
    /// Bind the application to `markup`.
    ///
    /// The notification path is chosen here, once: pages without the overlay
    /// get blocking notices for the lifetime of the view.
    #[must_use]
    pub fn new(markup: &PageMarkup, config: SiteConfig, store: Arc<PreferenceStore>) -> Self {
        let notifier = Notifier::detect(markup, markup::surface_ids());
        let gate = Gate::new(GateRules::from_config(&config), GateIds::default());
        let prefs = DisplayPrefs::new(config.font_size);
        Self {
            notifier,
            gate,
            downloads: Downloads::new(),
            prefs,
            store,
            nav: NavHighlight::from_markup(markup, NAV_PREFIX),
            tabs: TabSet::from_markup(markup, TAB_BUTTON_PREFIX, TAB_PANEL_CLASS),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    #[must_use]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    #[must_use]
    pub fn downloads(&self) -> &Downloads {
        &self.downloads
    }

    #[must_use]
    pub fn prefs(&self) -> &DisplayPrefs {
        &self.prefs
    }

    #[must_use]
    pub fn nav(&self) -> &NavHighlight {
        &self.nav
    }

    #[must_use]
    pub fn tabs(&self) -> &TabSet {
        &self.tabs
    }

    /// Show a notice through whichever path the view supports.
    fn notify(&mut self, title: &str, message: String) -> Cmd<Msg> {
        match self.notifier.present(title, message) {
            Some(notice) => Cmd::alert(notice.text()),
            None => Cmd::none(),
        }
    }

    fn save_prefs(&self) -> Cmd<Msg> {
        self.prefs.persist(&self.store);
        Cmd::save_state()
    }

    fn submit(&mut self, input: &CredentialInput) -> Cmd<Msg> {
        match self.gate.submit(input) {
            Ok(()) => {
                tracing::info!(roll_number = %input.roll_number, "results revealed");
                Cmd::none()
            }
            Err(err) => {
                tracing::debug!(error = %err, "credential check failed");
                self.notify(err.title(), err.message())
            }
        }
    }

    fn request_download(&mut self, filename: String) -> Cmd<Msg> {
        let job = self.downloads.request(filename);
        let (id, message) = (job.id, job.announce_message());
        tracing::info!(job = id.get(), filename = %job.filename, "download requested");
        let announce = self.notify(ANNOUNCE_TITLE, message);
        let wait = Cmd::after(self.config.download_delay(), move |fired| {
            Msg::DownloadElapsed {
                job: id,
                at: fired.wall,
            }
        });
        Cmd::batch(vec![announce, wait])
    }

    fn finish_download(&mut self, job: JobId, at: NaiveDateTime) -> Cmd<Msg> {
        let Some((done, artifact)) = self.downloads.complete(job, at, &self.config) else {
            tracing::debug!(job = job.get(), "completion for unknown download");
            return Cmd::none();
        };
        tracing::info!(
            job = job.get(),
            requested = %done.filename,
            saved_as = %artifact.filename,
            bytes = artifact.len(),
            "download completed"
        );
        self.notifier.dismiss();
        Cmd::save(artifact)
    }
}

impl Model for PortalApp {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        Cmd::sequence(vec![Cmd::restore_state(), Cmd::msg(Msg::PreferencesRestored)])
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Submit(input) => self.submit(&input),
            Msg::Reset => {
                if self.gate.reset() {
                    tracing::debug!("gate locked");
                }
                Cmd::reset_form(self.gate.ids().form.clone())
            }
            Msg::RequestDownload(filename) => self.request_download(filename),
            Msg::DownloadElapsed { job, at } => self.finish_download(job, at),
            Msg::DismissClicked => {
                self.notifier.dismiss();
                Cmd::none()
            }
            Msg::ToggleTheme => {
                let theme = self.prefs.toggle_theme();
                tracing::debug!(theme = theme.token(), "theme toggled");
                self.save_prefs()
            }
            Msg::FontIncrease => {
                if self.prefs.increase_font() {
                    self.save_prefs()
                } else {
                    Cmd::none()
                }
            }
            Msg::FontDecrease => {
                if self.prefs.decrease_font() {
                    self.save_prefs()
                } else {
                    Cmd::none()
                }
            }
            Msg::FontReset => {
                self.prefs.reset_font();
                self.save_prefs()
            }
            Msg::FontFamily(token) => {
                self.prefs.set_font_family(token);
                self.save_prefs()
            }
            Msg::NavClicked { link, href } => {
                self.nav.click(link, &href);
                Cmd::none()
            }
            Msg::TabClicked { button, panel } => {
                self.tabs.select(button, panel);
                Cmd::none()
            }
            Msg::PreferencesRestored => {
                self.prefs = DisplayPrefs::load(&self.store, self.config.font_size);
                tracing::debug!(
                    theme = self.prefs.theme().token(),
                    font_size = self.prefs.font_size(),
                    "preferences restored"
                );
                Cmd::none()
            }
            Msg::Leave => {
                let pending = self.downloads.pending();
                if pending > 0 {
                    tracing::debug!(pending, "leaving with downloads in flight");
                }
                Cmd::quit()
            }
            Msg::Ignored => Cmd::none(),
        }
    }

    fn view(&self, page: &mut Page) {
        self.prefs.render(page);
        self.nav.render(page);
        self.tabs.render(page);
        self.gate.render(page);
        self.notifier.render(page);
    }
}
