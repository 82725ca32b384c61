#![forbid(unsafe_code)]

//! Shared notification overlay.
//!
//! The page has a single notification slot. [`NotificationSurface`] owns it
//! when the markup ships the overlay; [`Notifier`] picks between the surface
//! and a blocking fallback once, at setup, so call sites never branch on
//! which path is live.
//!
//! # Invariants
//!
//! 1. **Single slot**: at most one notification is visible; `present` overwrites in place.
//! 2. **Idempotent dismiss**: dismissing an invisible surface leaves `{visible: false}`.
//! 3. **Backdrop only**: only clicks targeting the container itself dismiss.
//!
//! # Failure Modes
//!
//! | Scenario | Behavior |
//! |----------|----------|
//! | Overlay markup missing | `Notifier::BlockingFallback`, presents become blocking notices |
//! | Partial overlay markup | Treated as missing |
//! | Dismiss on fallback | No-op |

use portal_core::element::ElementId;
use portal_render::{Display, Page, PageMarkup};

use crate::Widget;

/// Anchor ids of the notification overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceIds {
    /// Backdrop container; clicks on it dismiss.
    pub container: ElementId,
    /// Text span of the title line. The heading's icon sits beside it, outside
    /// the span, so replacing the title text keeps the icon.
    pub title: ElementId,
    /// Message body.
    pub message: ElementId,
}

impl Default for SurfaceIds {
    fn default() -> Self {
        Self {
            container: ElementId::from_static("system-modal"),
            title: ElementId::from_static("modal-title-text"),
            message: ElementId::from_static("modal-message"),
        }
    }
}

impl SurfaceIds {
    /// Whether the markup carries every overlay anchor.
    #[must_use]
    pub fn present_in(&self, markup: &PageMarkup) -> bool {
        markup.contains_all([&self.container, &self.title, &self.message])
    }
}

/// Content and visibility of the notification slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    /// Whether the overlay is shown.
    pub visible: bool,
    /// Current title.
    pub title: String,
    /// Current message.
    pub message: String,
}

/// The overlay that owns the notification slot.
#[derive(Debug, Clone, Default)]
pub struct NotificationSurface {
    ids: SurfaceIds,
    state: NotificationState,
}

impl NotificationSurface {
    /// Create a hidden surface bound to `ids`.
    #[must_use]
    pub fn new(ids: SurfaceIds) -> Self {
        Self {
            ids,
            state: NotificationState::default(),
        }
    }

    /// Show `title` and `message`, replacing whatever was shown.
    pub fn present(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.state = NotificationState {
            visible: true,
            title: title.into(),
            message: message.into(),
        };
    }

    /// Hide the overlay and reset its content.
    pub fn dismiss(&mut self) {
        self.state = NotificationState::default();
    }

    /// Current slot state.
    #[must_use]
    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    /// Bound anchor ids.
    #[must_use]
    pub fn ids(&self) -> &SurfaceIds {
        &self.ids
    }

    /// Whether a click on `target` hit the backdrop rather than the content.
    #[must_use]
    pub fn is_backdrop_click(&self, target: &ElementId) -> bool {
        *target == self.ids.container
    }
}

impl Widget for NotificationSurface {
    fn render(&self, page: &mut Page) {
        page.update(&self.ids.container, |n| {
            n.show_if(self.state.visible, Display::Flex);
        });
        if self.state.visible {
            page.update(&self.ids.title, |n| n.set_text(self.state.title.as_str()));
            page.update(&self.ids.message, |n| n.set_text(self.state.message.as_str()));
        }
    }
}

/// A synchronous notice the host shows when the overlay is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingNotice {
    /// Notice title.
    pub title: String,
    /// Notice message.
    pub message: String,
}

impl BlockingNotice {
    /// Text handed to the host's blocking alert.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.title, self.message)
    }
}

/// Notification capability, selected once per view.
#[derive(Debug, Clone)]
pub enum Notifier {
    /// The overlay is in the markup.
    SurfacePresent(NotificationSurface),
    /// No overlay; presents become blocking notices.
    BlockingFallback,
}

impl Notifier {
    /// Pick the variant supported by `markup`.
    #[must_use]
    pub fn detect(markup: &PageMarkup, ids: SurfaceIds) -> Self {
        if ids.present_in(markup) {
            Self::SurfacePresent(NotificationSurface::new(ids))
        } else {
            portal_core::debug!(
                container = %ids.container,
                "notification overlay missing, using blocking fallback"
            );
            Self::BlockingFallback
        }
    }

    /// Present a notification.
    ///
    /// Returns the blocking notice the caller must hand to the host when the
    /// overlay is unavailable.
    #[must_use = "a fallback notice must be shown to the user"]
    pub fn present(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Option<BlockingNotice> {
        match self {
            Self::SurfacePresent(surface) => {
                surface.present(title, message);
                None
            }
            Self::BlockingFallback => Some(BlockingNotice {
                title: title.into(),
                message: message.into(),
            }),
        }
    }

    /// Hide the overlay. No-op on the fallback.
    pub fn dismiss(&mut self) {
        if let Self::SurfacePresent(surface) = self {
            surface.dismiss();
        }
    }

    /// Whether a notification is visible on the page.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.surface().is_some_and(NotificationSurface::is_visible)
    }

    /// The overlay, when present.
    #[must_use]
    pub fn surface(&self) -> Option<&NotificationSurface> {
        match self {
            Self::SurfacePresent(surface) => Some(surface),
            Self::BlockingFallback => None,
        }
    }

    /// Whether `target` is the overlay backdrop.
    #[must_use]
    pub fn is_backdrop_click(&self, target: &ElementId) -> bool {
        self.surface().is_some_and(|s| s.is_backdrop_click(target))
    }
}

impl Widget for Notifier {
    fn render(&self, page: &mut Page) {
        if let Some(surface) = self.surface() {
            surface.render(page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_render::Node;
    use pretty_assertions::assert_eq;

    fn overlay_markup() -> PageMarkup {
        let ids = SurfaceIds::default();
        PageMarkup::new()
            .with(ids.container, Node::hidden())
            .with_element(ids.title)
            .with_element(ids.message)
    }

    #[test]
    fn present_replaces_in_place() {
        let mut surface = NotificationSurface::default();
        surface.present("Downloading...", "first");
        surface.present("Captcha Error", "second");
        assert_eq!(
            surface.state(),
            &NotificationState {
                visible: true,
                title: "Captcha Error".into(),
                message: "second".into(),
            }
        );
    }

    #[test]
    fn dismiss_twice_is_safe() {
        let mut surface = NotificationSurface::default();
        surface.present("t", "m");
        surface.dismiss();
        assert!(!surface.is_visible());
        surface.dismiss();
        assert_eq!(surface.state(), &NotificationState::default());
    }

    #[test]
    fn only_backdrop_dismisses() {
        let surface = NotificationSurface::default();
        assert!(surface.is_backdrop_click(&ElementId::new("system-modal")));
        assert!(!surface.is_backdrop_click(&ElementId::new("modal-message")));
    }

    #[test]
    fn render_shows_overlay_as_flex() {
        let mut surface = NotificationSurface::default();
        surface.present("Invalid Roll Number", "bad");
        let mut page = overlay_markup().instantiate();
        surface.render(&mut page);

        let ids = SurfaceIds::default();
        assert_eq!(
            page.element(&ids.container).and_then(Node::display),
            Some(Display::Flex)
        );
        assert_eq!(page.text(&ids.title), Some("Invalid Roll Number"));
        assert_eq!(page.text(&ids.message), Some("bad"));
    }

    #[test]
    fn hidden_surface_leaves_text_alone() {
        let mut page = overlay_markup().instantiate();
        NotificationSurface::default().render(&mut page);
        assert_eq!(page, overlay_markup().instantiate());
        assert_eq!(page.text(&SurfaceIds::default().title), None);
    }

    #[test]
    fn detect_requires_every_anchor() {
        let ids = SurfaceIds::default();
        assert!(matches!(
            Notifier::detect(&overlay_markup(), ids.clone()),
            Notifier::SurfacePresent(_)
        ));

        let partial = PageMarkup::new()
            .with(ids.container.clone(), Node::hidden())
            .with_element(ids.title.clone());
        assert!(matches!(
            Notifier::detect(&partial, ids),
            Notifier::BlockingFallback
        ));
    }

    #[test]
    fn fallback_yields_blocking_notice() {
        let mut notifier = Notifier::BlockingFallback;
        let notice = notifier
            .present("Captcha Error", "Security PIN does not match.")
            .unwrap();
        assert_eq!(notice.text(), "Captcha Error\n\nSecurity PIN does not match.");
        notifier.dismiss();
        assert!(!notifier.is_visible());
    }

    #[test]
    fn fallback_render_touches_nothing() {
        let markup = PageMarkup::new().with_element("body");
        let mut page = markup.instantiate();
        Notifier::BlockingFallback.render(&mut page);
        assert_eq!(page, markup.instantiate());
    }
}
