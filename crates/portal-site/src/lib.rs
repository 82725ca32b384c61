#![forbid(unsafe_code)]

//! School portal site workflows.
//!
//! [`PortalApp`] is a [`portal_runtime::Model`] driving one loaded view:
//!
//! - the results gate ([`gate`]): four-field check, then reveal;
//! - simulated downloads ([`download`]): announce, wait, save a placeholder;
//! - display preferences ([`preferences`]): theme, font size, font family;
//! - navigation highlight and tabs.
//!
//! Hosts build the app against the page markup, then feed events through a
//! runner such as `portal_web::StepProgram` or the test
//! [`ProgramSimulator`](portal_runtime::ProgramSimulator).
//!
//! ```ignore
//! let markup = portal_site::markup::home_page();
//! let store = Arc::new(PreferenceStore::in_memory());
//! let app = PortalApp::new(&markup, SiteConfig::default(), store.clone());
//! let mut sim = ProgramSimulator::with_registry(app, markup, store);
//! sim.init();
//! sim.inject_event(Event::click("download-report"));
//! sim.advance_time(Duration::from_millis(1500));
//! assert_eq!(sim.saved()[0].filename, "report.txt");
//! ```

pub mod app;
pub mod config;
pub mod download;
pub mod gate;
pub mod markup;
pub mod preferences;

pub use app::{Msg, PortalApp};
pub use config::{ConfigError, FontSizeConfig, SiteConfig};
pub use download::{DownloadJob, DownloadPhase, Downloads, JobId};
pub use gate::{CredentialInput, Gate, GateRules, ValidationError, ViewState};
pub use preferences::{DisplayPrefs, Theme};
