#![forbid(unsafe_code)]

//! In-memory model of the bound page anchors.
//!
//! [`PageMarkup`] declares which anchors exist on the current page and their
//! initial state (what the static HTML ships with). Each render instantiates
//! a fresh [`Page`] from it, so a view only describes state, never deltas.
//!
//! # Invariants
//!
//! 1. A [`Page`] never gains or loses elements after instantiation.
//! 2. Writes through [`Page::update`] to an absent anchor are no-ops.
//! 3. An unset display, text or value means "leave the live element alone".
//!    Markup declares only the state a view owns; everything else the static
//!    HTML ships with (child content, stylesheet display) is never touched.

use std::collections::{BTreeMap, BTreeSet};

use portal_core::element::ElementId;

/// CSS `display` state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Display {
    /// `display: none`.
    Hidden,
    /// `display: block`.
    #[default]
    Block,
    /// `display: flex` (overlays).
    Flex,
}

impl Display {
    /// The CSS keyword for this state.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Hidden => "none",
            Self::Block => "block",
            Self::Flex => "flex",
        }
    }

    /// Whether the element is rendered at all.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Presentation state of a single anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    display: Option<Display>,
    text: Option<String>,
    value: Option<String>,
    classes: BTreeSet<String>,
    properties: BTreeMap<String, String>,
}

impl Node {
    /// An element whose state is entirely owned by the host document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A hidden element.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            display: Some(Display::Hidden),
            ..Self::default()
        }
    }

    /// Builder: set the display state.
    #[must_use]
    pub fn with_display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    /// Builder: set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: add a class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    /// Display state, if the markup or a view set one.
    #[must_use]
    pub fn display(&self) -> Option<Display> {
        self.display
    }

    /// Whether the element is rendered. Unset display counts as visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.display.is_none_or(Display::is_visible)
    }

    /// Set the display state.
    pub fn set_display(&mut self, display: Display) {
        self.display = Some(display);
    }

    /// Show with `display` or hide, depending on `visible`.
    pub fn show_if(&mut self, visible: bool, display: Display) {
        self.set_display(if visible { display } else { Display::Hidden });
    }

    /// Text content, if the markup or a view set one.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Replace the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Controlled value, if the view sets one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Set the control's value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    /// Whether the class is present.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Add or remove a class.
    pub fn set_class(&mut self, class: &str, on: bool) {
        if on {
            self.classes.insert(class.to_owned());
        } else {
            self.classes.remove(class);
        }
    }

    /// Iterate over classes in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Inline style property (e.g. a CSS custom property).
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Set an inline style property.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    pub(crate) fn remove_property(&mut self, name: &str) {
        self.properties.remove(name);
    }

    pub(crate) fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

/// The anchors a page ships with, and their initial state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMarkup {
    nodes: BTreeMap<ElementId, Node>,
}

impl PageMarkup {
    /// Empty markup (no anchors bound).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare an anchor with an initial state.
    #[must_use]
    pub fn with(mut self, id: impl Into<ElementId>, node: Node) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Builder: declare an anchor with no owned state.
    #[must_use]
    pub fn with_element(self, id: impl Into<ElementId>) -> Self {
        self.with(id, Node::new())
    }

    /// Declare or replace an anchor.
    pub fn insert(&mut self, id: impl Into<ElementId>, node: Node) {
        self.nodes.insert(id.into(), node);
    }

    /// Whether the anchor exists in this markup.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether every listed anchor exists.
    #[must_use]
    pub fn contains_all<'a>(&self, ids: impl IntoIterator<Item = &'a ElementId>) -> bool {
        ids.into_iter().all(|id| self.contains(id))
    }

    /// Number of declared anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no anchors are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over declared anchors in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &Node)> {
        self.nodes.iter()
    }

    /// Ids starting with `prefix`, in id order.
    #[must_use]
    pub fn ids_with_prefix(&self, prefix: &str) -> Vec<ElementId> {
        self.nodes
            .keys()
            .filter(|id| id.as_str().starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Ids whose initial state carries `class`, in id order.
    #[must_use]
    pub fn ids_with_class(&self, class: &str) -> Vec<ElementId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.has_class(class))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Create a fresh render target in the initial state.
    #[must_use]
    pub fn instantiate(&self) -> Page {
        Page {
            nodes: self.nodes.clone(),
        }
    }
}

/// A render target: the page anchors in some state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    nodes: BTreeMap<ElementId, Node>,
}

impl Page {
    /// Look up an anchor.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up an anchor mutably.
    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Apply `f` to the anchor if it exists.
    ///
    /// Returns whether the anchor was present.
    pub fn update(&mut self, id: &ElementId, f: impl FnOnce(&mut Node)) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }

    /// Whether the anchor exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether the anchor exists and is visible.
    #[must_use]
    pub fn is_visible(&self, id: &ElementId) -> bool {
        self.element(id).is_some_and(Node::is_visible)
    }

    /// Text of the anchor, if it exists and its text is set.
    #[must_use]
    pub fn text(&self, id: &ElementId) -> Option<&str> {
        self.element(id).and_then(Node::text)
    }

    /// Iterate over anchors in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &Node)> {
        self.nodes.iter()
    }

    /// Number of anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the page has no anchors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODAL: ElementId = ElementId::from_static("system-modal");
    const TITLE: ElementId = ElementId::from_static("modal-title");

    fn markup() -> PageMarkup {
        PageMarkup::new()
            .with(MODAL, Node::hidden())
            .with_element(TITLE)
    }

    #[test]
    fn instantiate_copies_initial_state() {
        let page = markup().instantiate();
        assert_eq!(page.len(), 2);
        assert!(!page.is_visible(&MODAL));
        assert!(page.is_visible(&TITLE));
    }

    #[test]
    fn update_absent_anchor_is_noop() {
        let mut page = markup().instantiate();
        let before = page.clone();
        let hit = page.update(&ElementId::new("missing"), |n| n.set_text("x"));
        assert!(!hit);
        assert_eq!(page, before);
    }

    #[test]
    fn show_if_toggles_display() {
        let mut node = Node::hidden();
        node.show_if(true, Display::Flex);
        assert_eq!(node.display(), Some(Display::Flex));
        node.show_if(false, Display::Flex);
        assert_eq!(node.display(), Some(Display::Hidden));
    }

    #[test]
    fn new_node_owns_nothing() {
        let node = Node::new();
        assert_eq!(node.display(), None);
        assert_eq!(node.text(), None);
        assert_eq!(node.value(), None);
        assert!(node.is_visible());

        let page = markup().instantiate();
        assert_eq!(page.text(&TITLE), None);
        assert_eq!(page.text(&ElementId::new("missing")), None);
    }

    #[test]
    fn classes_and_properties() {
        let mut node = Node::new().with_class("tab-btn");
        node.set_class("active", true);
        assert!(node.has_class("active"));
        node.set_class("active", false);
        assert!(!node.has_class("active"));
        assert_eq!(node.classes().collect::<Vec<_>>(), vec!["tab-btn"]);

        node.set_property("--base-size", "18px");
        assert_eq!(node.property("--base-size"), Some("18px"));
    }

    #[test]
    fn contains_all_requires_every_anchor() {
        let m = markup();
        assert!(m.contains_all([&MODAL, &TITLE]));
        assert!(!m.contains_all([&MODAL, &ElementId::new("modal-message")]));
    }

    #[test]
    fn lookup_by_prefix_and_class() {
        let m = PageMarkup::new()
            .with("nav-home", Node::new().with_class("active"))
            .with_element("nav-results")
            .with("panel-a", Node::new().with_class("tab-content"))
            .with_element("footer");
        assert_eq!(
            m.ids_with_prefix("nav-"),
            vec![ElementId::new("nav-home"), ElementId::new("nav-results")]
        );
        assert_eq!(m.ids_with_class("tab-content"), vec![ElementId::new("panel-a")]);
        assert_eq!(m.iter().count(), 4);
    }

    #[test]
    fn display_css_keywords() {
        assert_eq!(Display::Hidden.as_css(), "none");
        assert_eq!(Display::Block.as_css(), "block");
        assert_eq!(Display::Flex.as_css(), "flex");
        assert!(!Display::Hidden.is_visible());
    }
}
