#![forbid(unsafe_code)]

//! Navigation link highlight.

use portal_core::element::ElementId;
use portal_render::{Page, PageMarkup};

use crate::Widget;
use crate::tabs::ACTIVE_CLASS;

/// Tracks which in-page navigation link is highlighted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavHighlight {
    links: Vec<ElementId>,
    active: Option<ElementId>,
}

impl NavHighlight {
    /// Track the given links.
    #[must_use]
    pub fn new(links: Vec<ElementId>) -> Self {
        Self {
            links,
            active: None,
        }
    }

    /// Track every link whose id starts with `prefix`.
    #[must_use]
    pub fn from_markup(markup: &PageMarkup, prefix: &str) -> Self {
        Self::new(markup.ids_with_prefix(prefix))
    }

    /// Handle a click on `link` pointing at `href`.
    ///
    /// Only fragment links (`#...`) move the highlight. Returns whether it moved.
    pub fn click(&mut self, link: ElementId, href: &str) -> bool {
        if !href.starts_with('#') {
            return false;
        }
        self.active = Some(link);
        true
    }

    /// The highlighted link, once one was clicked.
    #[must_use]
    pub fn active(&self) -> Option<&ElementId> {
        self.active.as_ref()
    }
}

impl Widget for NavHighlight {
    fn render(&self, page: &mut Page) {
        let Some(active) = &self.active else {
            return;
        };
        for id in &self.links {
            page.update(id, |n| n.set_class(ACTIVE_CLASS, id == active));
        }
        page.update(active, |n| n.set_class(ACTIVE_CLASS, true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_render::Node;

    fn markup() -> PageMarkup {
        PageMarkup::new()
            .with("nav-home", Node::new().with_class(ACTIVE_CLASS))
            .with_element("nav-about")
            .with_element("nav-results")
    }

    #[test]
    fn fragment_link_takes_highlight() {
        let m = markup();
        let mut nav = NavHighlight::from_markup(&m, "nav-");
        assert!(nav.click("nav-about".into(), "#about"));

        let mut page = m.instantiate();
        nav.render(&mut page);
        let home = ElementId::new("nav-home");
        let about = ElementId::new("nav-about");
        assert!(!page.element(&home).unwrap().has_class(ACTIVE_CLASS));
        assert!(page.element(&about).unwrap().has_class(ACTIVE_CLASS));
    }

    #[test]
    fn page_link_leaves_highlight() {
        let m = markup();
        let mut nav = NavHighlight::from_markup(&m, "nav-");
        nav.click("nav-about".into(), "#about");
        assert!(!nav.click("nav-results".into(), "results.html"));
        assert_eq!(nav.active(), Some(&ElementId::new("nav-about")));
    }
}
