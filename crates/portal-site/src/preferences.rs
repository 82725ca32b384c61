#![forbid(unsafe_code)]

//! Display preferences: theme, font size, font family.
//!
//! Read from the [`PreferenceStore`] once at startup and written back on
//! every change. Stored values are plain strings under the keys
//! [`THEME_KEY`], [`FONT_SIZE_KEY`] and [`FONT_STYLE_KEY`].

use portal_render::Page;
use portal_runtime::PreferenceStore;
use portal_widgets::Widget;

use crate::config::FontSizeConfig;
use crate::markup::{BODY, FONT_SELECTOR, ROOT, THEME_ICON, THEME_LABEL};

pub const THEME_KEY: &str = "theme";
pub const FONT_SIZE_KEY: &str = "fontSize";
pub const FONT_STYLE_KEY: &str = "fontStyle";

/// Body class applied in dark mode.
pub const DARK_CLASS: &str = "dark-mode";

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse a stored token. Only `"dark"` selects the dark theme.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token == "dark" { Self::Dark } else { Self::Light }
    }

    /// Stored token.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Label of the toggle control, naming the theme it switches to.
    #[must_use]
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark Mode",
            Self::Dark => "Light Mode",
        }
    }

    /// Icon class of the toggle control.
    #[must_use]
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Self::Light => "fa-moon",
            Self::Dark => "fa-sun",
        }
    }
}

/// CSS font stack for a family token.
#[must_use]
pub fn font_stack(token: &str) -> &'static str {
    match token {
        "serif" => "'Times New Roman', serif",
        "mono" => "'Courier New', monospace",
        "readable" => "Verdana, sans-serif",
        _ => "'Segoe UI', sans-serif",
    }
}

/// Current display preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPrefs {
    bounds: FontSizeConfig,
    theme: Theme,
    font_size: u16,
    font_family: Option<String>,
}

impl DisplayPrefs {
    /// Defaults for first visit.
    #[must_use]
    pub fn new(bounds: FontSizeConfig) -> Self {
        Self {
            bounds,
            theme: Theme::Light,
            font_size: bounds.default,
            font_family: None,
        }
    }

    /// Read stored preferences.
    ///
    /// Unparsable sizes fall back to the default; out-of-range sizes are
    /// clamped to the bounds.
    #[must_use]
    pub fn load(store: &PreferenceStore, bounds: FontSizeConfig) -> Self {
        let mut prefs = Self::new(bounds);
        if let Some(theme) = store.get(THEME_KEY) {
            prefs.theme = Theme::from_token(&theme);
        }
        if let Some(size) = store.get(FONT_SIZE_KEY) {
            prefs.font_size = match size.trim().parse::<u16>() {
                Ok(n) => n.clamp(bounds.min, bounds.max),
                Err(_) => {
                    tracing::debug!(stored = %size, "unparsable font size, using default");
                    bounds.default
                }
            };
        }
        prefs.font_family = store.get(FONT_STYLE_KEY).filter(|s| !s.is_empty());
        prefs
    }

    /// Write every preference to the store.
    pub fn persist(&self, store: &PreferenceStore) {
        store.set(THEME_KEY, self.theme.token());
        store.set(FONT_SIZE_KEY, self.font_size.to_string());
        if let Some(family) = &self.font_family {
            store.set(FONT_STYLE_KEY, family.as_str());
        }
    }

    /// Flip the theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Grow the font by one step. Returns whether the size changed.
    pub fn increase_font(&mut self) -> bool {
        if self.font_size < self.bounds.max {
            self.font_size = (self.font_size + self.bounds.step).min(self.bounds.max);
            return true;
        }
        false
    }

    /// Shrink the font by one step. Returns whether the size changed.
    pub fn decrease_font(&mut self) -> bool {
        if self.font_size > self.bounds.min {
            self.font_size = self
                .font_size
                .saturating_sub(self.bounds.step)
                .max(self.bounds.min);
            return true;
        }
        false
    }

    /// Back to the default size.
    pub fn reset_font(&mut self) {
        self.font_size = self.bounds.default;
    }

    /// Select a font family by token.
    pub fn set_font_family(&mut self, token: impl Into<String>) {
        self.font_family = Some(token.into());
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    #[must_use]
    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }
}

impl Default for DisplayPrefs {
    fn default() -> Self {
        Self::new(FontSizeConfig::default())
    }
}

impl Widget for DisplayPrefs {
    fn render(&self, page: &mut Page) {
        let dark = self.theme == Theme::Dark;
        page.update(&BODY, |n| n.set_class(DARK_CLASS, dark));
        page.update(&THEME_ICON, |n| {
            for theme in [Theme::Light, Theme::Dark] {
                n.set_class(theme.toggle_icon(), theme == self.theme);
            }
        });
        page.update(&THEME_LABEL, |n| n.set_text(self.theme.toggle_label()));
        page.update(&ROOT, |n| {
            n.set_property("--base-size", format!("{}px", self.font_size));
            if let Some(family) = &self.font_family {
                n.set_property("--main-font", font_stack(family));
            }
        });
        if let Some(family) = &self.font_family {
            page.update(&FONT_SELECTOR, |n| n.set_value(family.as_str()));
        }
    }
}
