#![forbid(unsafe_code)]

//! Tabbed panels.
//!
//! Selecting a tab makes its button and its target panel the only ones
//! carrying the `active` class. Until something is selected the markup's
//! initial classes stand.

use portal_core::element::ElementId;
use portal_render::{Page, PageMarkup};

use crate::Widget;

/// Class marking the selected button and panel.
pub const ACTIVE_CLASS: &str = "active";

/// A group of tab buttons and the panels they switch between.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabSet {
    buttons: Vec<ElementId>,
    panels: Vec<ElementId>,
    selected: Option<(ElementId, ElementId)>,
}

impl TabSet {
    /// Create a tab set over explicit buttons and panels.
    #[must_use]
    pub fn new(buttons: Vec<ElementId>, panels: Vec<ElementId>) -> Self {
        Self {
            buttons,
            panels,
            selected: None,
        }
    }

    /// Discover buttons by id prefix and panels by class.
    #[must_use]
    pub fn from_markup(markup: &PageMarkup, button_prefix: &str, panel_class: &str) -> Self {
        Self::new(
            markup.ids_with_prefix(button_prefix),
            markup.ids_with_class(panel_class),
        )
    }

    /// Select `button`, showing `panel`.
    ///
    /// A panel that does not exist leaves every panel inactive.
    pub fn select(&mut self, button: ElementId, panel: ElementId) {
        self.selected = Some((button, panel));
    }

    /// The selected button, if any.
    #[must_use]
    pub fn selected_button(&self) -> Option<&ElementId> {
        self.selected.as_ref().map(|(b, _)| b)
    }

    /// The selected panel, if any.
    #[must_use]
    pub fn selected_panel(&self) -> Option<&ElementId> {
        self.selected.as_ref().map(|(_, p)| p)
    }

    /// Whether the set has no buttons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}

impl Widget for TabSet {
    fn render(&self, page: &mut Page) {
        let Some((button, panel)) = &self.selected else {
            return;
        };
        for id in &self.buttons {
            page.update(id, |n| n.set_class(ACTIVE_CLASS, id == button));
        }
        for id in &self.panels {
            page.update(id, |n| n.set_class(ACTIVE_CLASS, id == panel));
        }
        // The clicked button may sit outside the discovered set
        page.update(button, |n| n.set_class(ACTIVE_CLASS, true));
    }
}
