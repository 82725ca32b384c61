#![forbid(unsafe_code)]

//! Page widgets for the portal site.

pub mod nav;
pub mod notification;
pub mod tabs;
pub mod validation;

pub use nav::NavHighlight;
pub use notification::{
    BlockingNotice, NotificationState, NotificationSurface, Notifier, SurfaceIds,
};
pub use tabs::TabSet;

use portal_render::Page;

/// A `Widget` projects its state onto page anchors.
///
/// Widgets write through [`Page::update`], so anchors missing from the
/// current markup are skipped rather than treated as errors.
pub trait Widget {
    /// Render the widget's state onto the page.
    fn render(&self, page: &mut Page);
}
