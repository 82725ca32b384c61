#![forbid(unsafe_code)]

//! Anchor ids and page markup for the site.
//!
//! The ids mirror the static HTML. Pages are assembled from sections so
//! tests can build pages that lack any of them, such as a results page
//! shipped without the notification overlay.

use portal_core::element::ElementId;
use portal_render::{Node, PageMarkup};
use portal_widgets::SurfaceIds;

/// Document body; carries the theme class.
pub const BODY: ElementId = ElementId::from_static("body");
/// Document root; carries the font custom properties.
pub const ROOT: ElementId = ElementId::from_static("root");

pub const THEME_TOGGLE: ElementId = ElementId::from_static("theme-toggle");
/// Icon inside the theme toggle; carries the sun or moon glyph class.
pub const THEME_ICON: ElementId = ElementId::from_static("theme-toggle-icon");
/// Text span inside the theme toggle.
pub const THEME_LABEL: ElementId = ElementId::from_static("theme-toggle-label");
pub const FONT_INCREASE: ElementId = ElementId::from_static("font-increase");
pub const FONT_DECREASE: ElementId = ElementId::from_static("font-decrease");
pub const FONT_RESET: ElementId = ElementId::from_static("font-reset");
pub const FONT_SELECTOR: ElementId = ElementId::from_static("font-selector");

pub const MODAL: ElementId = ElementId::from_static("system-modal");
pub const MODAL_CONTENT: ElementId = ElementId::from_static("modal-content");
/// Title text span; the heading's info icon sits outside it.
pub const MODAL_TITLE: ElementId = ElementId::from_static("modal-title-text");
pub const MODAL_MESSAGE: ElementId = ElementId::from_static("modal-message");

pub const RESULT_FORM: ElementId = ElementId::from_static("result-form");
pub const ROLL_NO: ElementId = ElementId::from_static("roll-no");
pub const SCHOOL_NO: ElementId = ElementId::from_static("school-no");
pub const ADMIT_ID: ElementId = ElementId::from_static("admit-id");
pub const CAPTCHA: ElementId = ElementId::from_static("captcha");
pub const LOGIN_SECTION: ElementId = ElementId::from_static("login-section");
pub const MARK_SHEET: ElementId = ElementId::from_static("mark-sheet");
pub const DISPLAY_ROLL: ElementId = ElementId::from_static("display-roll");
pub const BACK_TO_LOGIN: ElementId = ElementId::from_static("back-to-login");

/// Download triggers: `download-<name>`, click data carries the filename.
pub const DOWNLOAD_PREFIX: &str = "download-";
/// Navigation links: `nav-<name>`, click data carries the href.
pub const NAV_PREFIX: &str = "nav-";
/// Tab buttons: `tab-btn-<name>`, click data carries the panel id.
pub const TAB_BUTTON_PREFIX: &str = "tab-btn-";
/// Class shared by tab panels.
pub const TAB_PANEL_CLASS: &str = "tab-content";

/// Anchor ids of the results gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateIds {
    /// The credential form.
    pub form: ElementId,
    /// Roll number field.
    pub roll_number: ElementId,
    /// School number field.
    pub school_number: ElementId,
    /// Admit card id field.
    pub admit_id: ElementId,
    /// Security code field.
    pub security_code: ElementId,
    /// Input view, shown while locked.
    pub login_section: ElementId,
    /// Results view, shown once revealed.
    pub mark_sheet: ElementId,
    /// Where the validated roll number is echoed.
    pub display_roll: ElementId,
    /// Control returning to the input view.
    pub reset: ElementId,
}

impl Default for GateIds {
    fn default() -> Self {
        Self {
            form: RESULT_FORM,
            roll_number: ROLL_NO,
            school_number: SCHOOL_NO,
            admit_id: ADMIT_ID,
            security_code: CAPTCHA,
            login_section: LOGIN_SECTION,
            mark_sheet: MARK_SHEET,
            display_roll: DISPLAY_ROLL,
            reset: BACK_TO_LOGIN,
        }
    }
}

/// Overlay ids used by the site.
#[must_use]
pub fn surface_ids() -> SurfaceIds {
    SurfaceIds {
        container: MODAL,
        title: MODAL_TITLE,
        message: MODAL_MESSAGE,
    }
}

/// Header controls and body/root anchors present on every page.
#[must_use]
pub fn with_chrome(markup: PageMarkup) -> PageMarkup {
    markup
        .with_element(BODY)
        .with_element(ROOT)
        .with_element(THEME_TOGGLE)
        .with(THEME_ICON, Node::new().with_class("fa-moon"))
        .with(THEME_LABEL, Node::new().with_text("Dark Mode"))
        .with_element(FONT_INCREASE)
        .with_element(FONT_DECREASE)
        .with_element(FONT_RESET)
        .with_element(FONT_SELECTOR)
        .with("nav-home", Node::new().with_class("active"))
        .with_element("nav-about")
        .with_element("nav-academics")
        .with_element("nav-results")
}

/// The shared notification overlay, hidden.
#[must_use]
pub fn with_notification_overlay(markup: PageMarkup) -> PageMarkup {
    markup
        .with(MODAL, Node::hidden())
        .with_element(MODAL_CONTENT)
        .with_element(MODAL_TITLE)
        .with_element(MODAL_MESSAGE)
}

/// The credential form and the hidden results view.
#[must_use]
pub fn with_result_gate(markup: PageMarkup) -> PageMarkup {
    markup
        .with_element(RESULT_FORM)
        .with_element(ROLL_NO)
        .with_element(SCHOOL_NO)
        .with_element(ADMIT_ID)
        .with_element(CAPTCHA)
        .with_element(LOGIN_SECTION)
        .with(MARK_SHEET, Node::hidden())
        .with_element(DISPLAY_ROLL)
        .with_element(BACK_TO_LOGIN)
}

/// Download triggers for each filename.
#[must_use]
pub fn with_downloads<'a>(
    mut markup: PageMarkup,
    filenames: impl IntoIterator<Item = &'a str>,
) -> PageMarkup {
    for name in filenames {
        markup.insert(ElementId::new(format!("{DOWNLOAD_PREFIX}{name}")), Node::new());
    }
    markup
}

/// A tab strip with the first tab active.
#[must_use]
pub fn with_tabs<'a>(
    mut markup: PageMarkup,
    panels: impl IntoIterator<Item = &'a str>,
) -> PageMarkup {
    for (i, panel) in panels.into_iter().enumerate() {
        let mut button = Node::new();
        let mut content = Node::new().with_class(TAB_PANEL_CLASS);
        if i == 0 {
            button.set_class("active", true);
            content.set_class("active", true);
        }
        markup.insert(ElementId::new(format!("{TAB_BUTTON_PREFIX}{panel}")), button);
        markup.insert(ElementId::new(panel.to_owned()), content);
    }
    markup
}

/// The landing page: overlay, tabs, and downloads.
#[must_use]
pub fn home_page() -> PageMarkup {
    let markup = with_notification_overlay(with_chrome(PageMarkup::new()));
    let markup = with_tabs(markup, ["about", "admissions", "facilities"]);
    with_downloads(markup, ["syllabus", "calendar", "report"])
}

/// The results page as shipped: no notification overlay.
#[must_use]
pub fn results_page() -> PageMarkup {
    with_result_gate(with_chrome(PageMarkup::new()))
}

/// The results page with the overlay included.
#[must_use]
pub fn results_page_with_overlay() -> PageMarkup {
    with_notification_overlay(results_page())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_page_lacks_overlay() {
        let page = results_page();
        assert!(!surface_ids().present_in(&page));
        assert!(surface_ids().present_in(&results_page_with_overlay()));
        assert!(page.contains(&ROLL_NO));
    }

    #[test]
    fn home_page_sections() {
        let page = home_page();
        assert_eq!(page.ids_with_prefix(DOWNLOAD_PREFIX).len(), 3);
        assert_eq!(page.ids_with_prefix(TAB_BUTTON_PREFIX).len(), 3);
        assert_eq!(page.ids_with_class(TAB_PANEL_CLASS).len(), 3);
        assert_eq!(page.ids_with_prefix(NAV_PREFIX).len(), 4);
        assert!(surface_ids().present_in(&page));
    }

    #[test]
    fn mark_sheet_starts_hidden() {
        let page = results_page().instantiate();
        assert!(!page.is_visible(&MARK_SHEET));
        assert!(page.is_visible(&LOGIN_SECTION));
    }
}
