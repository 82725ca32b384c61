#![forbid(unsafe_code)]

//! Canonical page events.
//!
//! The host (the browser glue) translates DOM listeners into these values and
//! pushes them into the runtime. All events derive `Clone`, `PartialEq`, and
//! `Eq` for use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Default browser actions (form navigation, link following) are the host's
//!   concern; by the time an [`Event::Submit`] arrives it has been intercepted.
//! - Click targets are the innermost element with an id, so a click on modal
//!   content never reports the modal container as its target.

use crate::element::ElementId;

/// Canonical page event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A click on an element.
    Click(ClickEvent),

    /// A form was submitted.
    Submit {
        /// The submitted form.
        form: ElementId,
        /// Field values captured at submission time, untrimmed.
        fields: FormData,
    },

    /// A select or input committed a new value.
    Change {
        /// The changed control.
        target: ElementId,
        /// The control's new value.
        value: String,
    },

    /// The view is being torn down (navigation away, page hide).
    Unload,
}

impl Event {
    /// Shorthand for a click without a data payload.
    #[must_use]
    pub fn click(target: impl Into<ElementId>) -> Self {
        Self::Click(ClickEvent::new(target))
    }

    /// Shorthand for a click carrying a `data-*` payload.
    #[must_use]
    pub fn click_with(target: impl Into<ElementId>, data: impl Into<String>) -> Self {
        Self::Click(ClickEvent::new(target).with_data(data))
    }
}

/// A click on a page element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    /// The element the click targeted.
    pub target: ElementId,
    /// Payload from the element's `data-*` attribute (tab panel, file name, href).
    pub data: Option<String>,
}

impl ClickEvent {
    /// Create a click on `target` without payload.
    #[must_use]
    pub fn new(target: impl Into<ElementId>) -> Self {
        Self {
            target: target.into(),
            data: None,
        }
    }

    /// Attach a `data-*` payload.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Ordered name/value pairs of a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    /// Create empty form data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Append a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value submitted under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of submitted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no fields were submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (n, v) in iter {
            data.insert(n, v);
        }
        data
    }
}
