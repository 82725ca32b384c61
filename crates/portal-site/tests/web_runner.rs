//! The site under the host-driven step runner.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use portal_core::event::{Event, FormData};
use portal_core::element::ElementId;
use portal_render::{Display, DomPatch, Page, PageDiff, PageMarkup};
use portal_runtime::PreferenceStore;
use portal_site::markup::{
    self, BODY, DISPLAY_ROLL, LOGIN_SECTION, MARK_SHEET, MODAL, MODAL_CONTENT, MODAL_TITLE,
    RESULT_FORM, TAB_PANEL_CLASS,
};
use portal_site::{PortalApp, SiteConfig};
use portal_web::StepProgram;

fn unstarted(markup: PageMarkup) -> StepProgram<PortalApp> {
    let store = Arc::new(PreferenceStore::in_memory());
    let app = PortalApp::new(&markup, SiteConfig::default(), Arc::clone(&store));
    StepProgram::new(app, markup).with_preferences(store)
}

fn runner(markup: PageMarkup) -> StepProgram<PortalApp> {
    let epoch = NaiveDate::from_ymd_opt(2024, 3, 7)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap();
    let mut program = unstarted(markup).with_epoch(epoch);
    program.init().unwrap();
    program
}

/// The document as the browser holds it: every bound anchor, plus the static
/// content and stylesheet state the markup leaves to the HTML.
fn live_document(markup: &PageMarkup) -> Page {
    let mut live = PageMarkup::new();
    for (id, node) in markup.iter() {
        let mut node = node.clone();
        if let Some(text) = static_text(id) {
            node.set_text(text);
        }
        if node.has_class(TAB_PANEL_CLASS) && !node.has_class("active") {
            node.set_display(Display::Hidden);
        }
        live.insert(id.clone(), node);
    }
    live.instantiate()
}

fn static_text(id: &ElementId) -> Option<&'static str> {
    match id.as_str() {
        "body" => Some("Springfield Public School"),
        "login-section" => Some("Enter your credentials"),
        "mark-sheet" => Some("Statement of Marks"),
        "modal-content" => Some("System Notice"),
        "about" => Some("Founded in 1962"),
        "admissions" => Some("Admissions open in May"),
        "facilities" => Some("Library and labs"),
        _ => None,
    }
}

fn replay(live: &mut Page, program: &mut StepProgram<PortalApp>) {
    live.apply(&PageDiff::from(program.take_outputs().patches));
}

#[test]
fn download_hands_off_after_the_delay() {
    let mut program = runner(markup::home_page());
    let first = program.take_outputs();
    assert!(first.full_repaint);

    program.push_event(Event::click("download-report"));
    let result = program.step().unwrap();
    assert_eq!(result.events_processed, 1);
    assert!(result.rendered);
    let opened = program.take_outputs();
    assert!(opened.patches.contains(&DomPatch::SetDisplay {
        id: MODAL,
        display: Display::Flex,
    }));
    assert!(opened.downloads.is_empty());
    assert_eq!(program.next_deadline(), Some(Duration::from_millis(1500)));

    program.advance_time(Duration::from_millis(1500));
    let result = program.step().unwrap();
    assert_eq!(result.timers_fired, 1);
    let done = program.take_outputs();
    assert_eq!(done.downloads.len(), 1);
    let download = &done.downloads[0];
    assert_eq!(download.filename, "report.txt");
    assert_eq!(download.mime, "text/plain");
    assert!(download.contents.contains("File Name: report"));
    assert!(download.contents.ends_with("Date: 3/7/2024, 9:00:01 AM"));
    assert!(done.patches.contains(&DomPatch::SetDisplay {
        id: MODAL,
        display: Display::Hidden,
    }));
}

#[test]
fn artifact_date_defaults_to_local_time() {
    let mut program = unstarted(markup::home_page());
    program.init().unwrap();
    let year = program.now_wall().format("%Y").to_string();

    program.push_event(Event::click("download-report"));
    program.step().unwrap();
    program.advance_time(Duration::from_millis(1500));
    program.step().unwrap();

    let done = program.take_outputs();
    let contents = &done.downloads[0].contents;
    assert!(!contents.contains("1970"), "{contents}");
    assert!(contents.contains(&year), "{contents}");
}

#[test]
fn first_frame_preserves_static_content() {
    let markup = markup::home_page();
    let mut live = live_document(&markup);
    let before = live.clone();
    let mut program = runner(markup);

    let first = program.take_outputs();
    assert!(first.full_repaint);
    for patch in &first.patches {
        assert!(
            !matches!(patch, DomPatch::SetText { id, .. } if static_text(id).is_some()),
            "{patch:?}"
        );
    }
    live.apply(&PageDiff::from(first.patches));

    for (id, node) in before.iter() {
        assert_eq!(live.text(id), node.text(), "{id}");
    }
    assert!(live.is_visible(&ElementId::new("about")));
    assert!(!live.is_visible(&ElementId::new("admissions")));
    assert!(!live.is_visible(&ElementId::new("facilities")));
    assert!(!live.is_visible(&MODAL));
    assert_eq!(live.text(&BODY), Some("Springfield Public School"));
}

#[test]
fn workflows_keep_static_content_in_place() {
    let markup = markup::home_page();
    let mut live = live_document(&markup);
    let mut program = runner(markup);
    replay(&mut live, &mut program);

    program.push_event(Event::click_with("tab-btn-admissions", "admissions"));
    program.push_event(Event::click("download-report"));
    program.step().unwrap();
    replay(&mut live, &mut program);
    assert!(live.is_visible(&MODAL));
    assert_eq!(live.text(&MODAL_TITLE), Some("Downloading..."));
    assert_eq!(live.text(&MODAL_CONTENT), Some("System Notice"));
    assert!(live.element(&ElementId::new("admissions")).unwrap().has_class("active"));
    assert!(!live.element(&ElementId::new("about")).unwrap().has_class("active"));

    program.advance_time(Duration::from_millis(1500));
    program.step().unwrap();
    replay(&mut live, &mut program);
    assert!(!live.is_visible(&MODAL));
    assert_eq!(live.text(&BODY), Some("Springfield Public School"));
    assert_eq!(live.text(&ElementId::new("about")), Some("Founded in 1962"));
}

#[test]
fn results_page_first_frame_keeps_sections() {
    let markup = markup::results_page();
    let mut live = live_document(&markup);
    let mut program = runner(markup);
    replay(&mut live, &mut program);

    assert_eq!(live.text(&LOGIN_SECTION), Some("Enter your credentials"));
    assert_eq!(live.text(&MARK_SHEET), Some("Statement of Marks"));
    assert!(live.is_visible(&LOGIN_SECTION));
    assert!(!live.is_visible(&MARK_SHEET));
}

#[test]
fn gate_reveal_and_fallback_alert() {
    let mut program = runner(markup::results_page());
    program.take_outputs();

    let submit = |code: &str| Event::Submit {
        form: RESULT_FORM,
        fields: FormData::new()
            .with("roll-no", "12345678")
            .with("school-no", "99999")
            .with("admit-id", "ADMIT01")
            .with("captcha", code),
    };

    program.push_event(submit("nope"));
    program.step().unwrap();
    let out = program.take_outputs();
    assert_eq!(
        out.alerts,
        ["Captcha Error\n\nSecurity PIN does not match. Please enter 'K9PLX'."]
    );

    program.push_event(submit("K9PLX"));
    program.step().unwrap();
    let page = program.page().unwrap();
    assert!(page.is_visible(&MARK_SHEET));
    assert_eq!(page.text(&DISPLAY_ROLL), Some("12345678"));

    program.push_event(Event::click("back-to-login"));
    program.step().unwrap();
    assert_eq!(program.take_outputs().form_resets, [RESULT_FORM]);
    assert!(!program.page().unwrap().is_visible(&MARK_SHEET));
}

#[test]
fn unload_stops_the_runner() {
    let mut program = runner(markup::home_page());
    program.push_event(Event::click("download-calendar"));
    program.push_event(Event::Unload);
    let result = program.step().unwrap();
    assert!(!result.running);
    assert_eq!(program.next_deadline(), None);

    program.advance_time(Duration::from_secs(2));
    let result = program.step().unwrap();
    assert_eq!(result.timers_fired, 0);
    assert!(program.take_outputs().downloads.is_empty());
}
