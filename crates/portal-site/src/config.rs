#![forbid(unsafe_code)]

//! Site configuration.
//!
//! Every constant the workflows depend on lives here so hosts can override
//! it (e.g. a shorter download delay in a demo build). Missing keys in a
//! JSON document take their defaults.
//!
//! # Example
//!
//! ```ignore
//! let config = SiteConfig::from_json(r#"{"download_delay_ms": 500}"#)?;
//! assert_eq!(config.security_code, "K9PLX");
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Errors loading a [`SiteConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this schema.
    #[error("invalid site config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Values parse but contradict each other.
    #[error("inconsistent site config: {0}")]
    Invalid(String),
}

/// Font size bounds in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FontSizeConfig {
    /// Smallest size reachable with the decrease control.
    pub min: u16,
    /// Largest size reachable with the increase control.
    pub max: u16,
    /// Change per click.
    pub step: u16,
    /// Size on first visit and after reset.
    pub default: u16,
}

impl Default for FontSizeConfig {
    fn default() -> Self {
        Self {
            min: 12,
            max: 24,
            step: 2,
            default: 16,
        }
    }
}

/// Tunables for the site workflows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Simulated network latency before a download completes, in milliseconds.
    pub download_delay_ms: u64,
    /// Fixed challenge code, compared case-insensitively.
    pub security_code: String,
    /// Exact digit count of a roll number.
    pub roll_number_len: usize,
    /// Exact digit count of a school number.
    pub school_number_len: usize,
    /// Minimum length of an admit card id.
    pub admit_id_min_len: usize,
    /// Font size bounds.
    pub font_size: FontSizeConfig,
    /// Project label embedded in generated artifacts.
    pub artifact_project: String,
    /// `chrono` format string for the artifact timestamp.
    pub timestamp_format: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            download_delay_ms: 1500,
            security_code: "K9PLX".to_owned(),
            roll_number_len: 8,
            school_number_len: 5,
            admit_id_min_len: 6,
            font_size: FontSizeConfig::default(),
            artifact_project: "CBSE Web Development Project".to_owned(),
            timestamp_format: "%-m/%-d/%Y, %-I:%M:%S %p".to_owned(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.font_size;
        if f.step == 0 {
            return Err(ConfigError::Invalid("font_size.step must be positive".into()));
        }
        if !(f.min <= f.default && f.default <= f.max) {
            return Err(ConfigError::Invalid(format!(
                "font_size.default {} outside {}..={}",
                f.default, f.min, f.max
            )));
        }
        if self.security_code.is_empty() {
            return Err(ConfigError::Invalid("security_code must not be empty".into()));
        }
        if self.roll_number_len == 0 || self.school_number_len == 0 {
            return Err(ConfigError::Invalid("digit field lengths must be positive".into()));
        }
        Ok(())
    }

    /// Download delay as a [`Duration`].
    #[must_use]
    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.download_delay_ms)
    }

    /// Set the download delay.
    #[must_use]
    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the challenge code.
    #[must_use]
    pub fn with_security_code(mut self, code: impl Into<String>) -> Self {
        self.security_code = code.into();
        self
    }

    /// Set the font size bounds.
    #[must_use]
    pub fn with_font_size(mut self, font_size: FontSizeConfig) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the project label embedded in artifacts.
    #[must_use]
    pub fn with_artifact_project(mut self, project: impl Into<String>) -> Self {
        self.artifact_project = project.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_site() {
        let config = SiteConfig::default();
        assert_eq!(config.download_delay(), Duration::from_millis(1500));
        assert_eq!(config.security_code, "K9PLX");
        assert_eq!(config.font_size.default, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            SiteConfig::from_json(r#"{"download_delay_ms": 250, "font_size": {"max": 30}}"#)
                .unwrap();
        assert_eq!(config.download_delay_ms, 250);
        assert_eq!(config.font_size.max, 30);
        assert_eq!(config.font_size.min, 12);
        assert_eq!(config.roll_number_len, 8);
    }

    #[test]
    fn rejects_inconsistent_font_bounds() {
        let err = SiteConfig::from_json(r#"{"font_size": {"default": 40}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = SiteConfig::from_json(r#"{"font_size": {"step": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("step"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = SiteConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn builder_overrides() {
        let config = SiteConfig::default()
            .with_download_delay(Duration::from_secs(2))
            .with_security_code("ABCDE")
            .with_artifact_project("Demo");
        assert_eq!(config.download_delay_ms, 2000);
        assert_eq!(config.security_code, "ABCDE");
        assert_eq!(config.artifact_project, "Demo");
    }
}
