#![forbid(unsafe_code)]

//! Page diffing.
//!
//! [`PageDiff::compute`] compares two pages instantiated from the same
//! markup and emits the patches that turn the live document from `prev`
//! into `next`. Patch order is deterministic: anchors in id order, and per
//! anchor display, text, value, classes, then properties.
//!
//! Display, text and value are only ever written when the next page sets
//! them. An anchor whose field is unset is left as the host document has it,
//! both on the first frame and when a view stops setting the field.

use portal_core::element::ElementId;

use crate::page::{Display, Node, Page};

/// One mutation the host applies to the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum DomPatch {
    /// Set `style.display`.
    SetDisplay { id: ElementId, display: Display },
    /// Replace `textContent`.
    SetText { id: ElementId, text: String },
    /// Set a control's `value`.
    SetValue { id: ElementId, value: String },
    /// `classList.add`.
    AddClass { id: ElementId, class: String },
    /// `classList.remove`.
    RemoveClass { id: ElementId, class: String },
    /// `style.setProperty`.
    SetProperty {
        id: ElementId,
        name: String,
        value: String,
    },
    /// `style.removeProperty`.
    RemoveProperty { id: ElementId, name: String },
}

impl DomPatch {
    /// The anchor this patch targets.
    #[must_use]
    pub fn id(&self) -> &ElementId {
        match self {
            Self::SetDisplay { id, .. }
            | Self::SetText { id, .. }
            | Self::SetValue { id, .. }
            | Self::AddClass { id, .. }
            | Self::RemoveClass { id, .. }
            | Self::SetProperty { id, .. }
            | Self::RemoveProperty { id, .. } => id,
        }
    }
}

/// An ordered batch of patches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDiff {
    patches: Vec<DomPatch>,
}

impl PageDiff {
    /// Compute the patches from `prev` to `next`.
    ///
    /// Anchors present only in `next` are emitted in full; anchors present
    /// only in `prev` are ignored (pages never remove anchors).
    #[must_use]
    pub fn compute(prev: &Page, next: &Page) -> Self {
        let span = portal_core::trace_span!("page_diff", anchors = next.len());
        let _guard = span.enter();

        let mut patches = Vec::new();
        for (id, node) in next.iter() {
            match prev.element(id) {
                Some(old) => diff_node(id, old, node, &mut patches),
                None => full_node(id, node, &mut patches),
            }
        }
        Self { patches }
    }

    /// Patches that establish every anchor's owned state from scratch.
    ///
    /// Fields the page leaves unset produce no patch.
    #[must_use]
    pub fn full(page: &Page) -> Self {
        let mut patches = Vec::new();
        for (id, node) in page.iter() {
            full_node(id, node, &mut patches);
        }
        Self { patches }
    }

    /// The patches in application order.
    #[must_use]
    pub fn patches(&self) -> &[DomPatch] {
        &self.patches
    }

    /// Consume into the patch list.
    #[must_use]
    pub fn into_patches(self) -> Vec<DomPatch> {
        self.patches
    }

    /// Number of patches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Whether the pages were identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

impl From<Vec<DomPatch>> for PageDiff {
    fn from(patches: Vec<DomPatch>) -> Self {
        Self { patches }
    }
}

impl Page {
    /// Apply patches in order, as the host would against the live document.
    ///
    /// Patches for anchors the page lacks are skipped.
    pub fn apply(&mut self, diff: &PageDiff) {
        for patch in diff.patches() {
            self.update(patch.id(), |node| match patch {
                DomPatch::SetDisplay { display, .. } => node.set_display(*display),
                DomPatch::SetText { text, .. } => node.set_text(text.clone()),
                DomPatch::SetValue { value, .. } => node.set_value(value.clone()),
                DomPatch::AddClass { class, .. } => node.set_class(class, true),
                DomPatch::RemoveClass { class, .. } => node.set_class(class, false),
                DomPatch::SetProperty { name, value, .. } => {
                    node.set_property(name.clone(), value.clone());
                }
                DomPatch::RemoveProperty { name, .. } => node.remove_property(name),
            });
        }
    }
}

fn full_node(id: &ElementId, node: &Node, out: &mut Vec<DomPatch>) {
    if let Some(display) = node.display() {
        out.push(DomPatch::SetDisplay {
            id: id.clone(),
            display,
        });
    }
    if let Some(text) = node.text() {
        out.push(DomPatch::SetText {
            id: id.clone(),
            text: text.to_owned(),
        });
    }
    if let Some(value) = node.value() {
        out.push(DomPatch::SetValue {
            id: id.clone(),
            value: value.to_owned(),
        });
    }
    for class in node.classes() {
        out.push(DomPatch::AddClass {
            id: id.clone(),
            class: class.to_owned(),
        });
    }
    for (name, value) in node.properties() {
        out.push(DomPatch::SetProperty {
            id: id.clone(),
            name: name.clone(),
            value: value.clone(),
        });
    }
}

fn diff_node(id: &ElementId, old: &Node, new: &Node, out: &mut Vec<DomPatch>) {
    if let Some(display) = new.display()
        && old.display() != Some(display)
    {
        out.push(DomPatch::SetDisplay {
            id: id.clone(),
            display,
        });
    }
    if let Some(text) = new.text()
        && old.text() != Some(text)
    {
        out.push(DomPatch::SetText {
            id: id.clone(),
            text: text.to_owned(),
        });
    }
    if let Some(value) = new.value()
        && old.value() != Some(value)
    {
        out.push(DomPatch::SetValue {
            id: id.clone(),
            value: value.to_owned(),
        });
    }
    for class in old.classes().filter(|c| !new.has_class(c)) {
        out.push(DomPatch::RemoveClass {
            id: id.clone(),
            class: class.to_owned(),
        });
    }
    for class in new.classes().filter(|c| !old.has_class(c)) {
        out.push(DomPatch::AddClass {
            id: id.clone(),
            class: class.to_owned(),
        });
    }
    for name in old.properties().keys() {
        if new.property(name).is_none() {
            out.push(DomPatch::RemoveProperty {
                id: id.clone(),
                name: name.clone(),
            });
        }
    }
    for (name, value) in new.properties() {
        if old.property(name) != Some(value.as_str()) {
            out.push(DomPatch::SetProperty {
                id: id.clone(),
                name: name.clone(),
                value: value.clone(),
            });
        }
    }
}
