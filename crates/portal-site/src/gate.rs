#![forbid(unsafe_code)]

//! Results gate.
//!
//! `Locked --(submit, all checks pass)--> Revealed --(reset)--> Locked`.
//! No other transitions exist: failed submissions leave the gate locked,
//! and there is no expiry.
//!
//! Checks run in a fixed order and stop at the first failure:
//! roll number, school number, admit card id, security code.

use portal_core::element::ElementId;
use portal_core::event::FormData;
use portal_render::{Display, Page};
use portal_widgets::Widget;
use portal_widgets::validation::{has_min_chars, is_exact_digits, matches_code};

use crate::config::SiteConfig;
use crate::markup::GateIds;

/// Values captured from the credential form at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialInput {
    pub roll_number: String,
    pub school_number: String,
    pub admit_id: String,
    pub security_code: String,
}

impl CredentialInput {
    /// Build from already-trimmed values.
    #[must_use]
    pub fn new(
        roll_number: impl Into<String>,
        school_number: impl Into<String>,
        admit_id: impl Into<String>,
        security_code: impl Into<String>,
    ) -> Self {
        Self {
            roll_number: roll_number.into(),
            school_number: school_number.into(),
            admit_id: admit_id.into(),
            security_code: security_code.into(),
        }
    }

    /// Read the four fields from a submission, trimming each.
    ///
    /// A missing field reads as empty.
    #[must_use]
    pub fn from_form(fields: &FormData, ids: &GateIds) -> Self {
        let read = |id: &ElementId| {
            fields.get(id.as_str()).unwrap_or_default().trim().to_owned()
        };
        Self {
            roll_number: read(&ids.roll_number),
            school_number: read(&ids.school_number),
            admit_id: read(&ids.admit_id),
            security_code: read(&ids.security_code),
        }
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed roll number (expected {len} digits)")]
    MalformedRollNumber { len: usize },
    #[error("malformed school number (expected {len} digits)")]
    MalformedSchoolNumber { len: usize },
    #[error("admit card id shorter than {min} characters")]
    AdmitIdTooShort { min: usize },
    #[error("security code mismatch")]
    ChallengeMismatch { expected: String },
}

impl ValidationError {
    /// Title shown to the user.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::MalformedRollNumber { .. } => "Invalid Roll Number",
            Self::MalformedSchoolNumber { .. } => "Invalid School Number",
            Self::AdmitIdTooShort { .. } => "Invalid Admit Card ID",
            Self::ChallengeMismatch { .. } => "Captcha Error",
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MalformedRollNumber { len } => format!(
                "Please enter a valid {len}-digit Roll Number (e.g., {}).",
                counting_digits(*len)
            ),
            Self::MalformedSchoolNumber { len } => format!(
                "Please enter a valid {len}-digit School Number (e.g., {}).",
                "9".repeat(*len)
            ),
            Self::AdmitIdTooShort { min } => {
                format!("Admit Card ID is too short (min {min} chars).")
            }
            Self::ChallengeMismatch { expected } => {
                format!("Security PIN does not match. Please enter '{expected}'.")
            }
        }
    }
}

// "12345678" for 8
fn counting_digits(len: usize) -> String {
    (1..=len)
        .map(|i| char::from(b'0' + (i % 10) as u8))
        .collect()
}

/// Whether the results are showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Locked,
    Revealed {
        /// The validated roll number, echoed verbatim.
        roll_number: String,
    },
}

/// The four checks, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRules {
    roll_number_len: usize,
    school_number_len: usize,
    admit_id_min_len: usize,
    security_code: String,
}

impl GateRules {
    /// Rules derived from the site configuration.
    #[must_use]
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            roll_number_len: config.roll_number_len,
            school_number_len: config.school_number_len,
            admit_id_min_len: config.admit_id_min_len,
            security_code: config.security_code.clone(),
        }
    }

    /// Run every check in order, stopping at the first failure.
    pub fn validate(&self, input: &CredentialInput) -> Result<(), ValidationError> {
        if !is_exact_digits(&input.roll_number, self.roll_number_len) {
            return Err(ValidationError::MalformedRollNumber {
                len: self.roll_number_len,
            });
        }
        if !is_exact_digits(&input.school_number, self.school_number_len) {
            return Err(ValidationError::MalformedSchoolNumber {
                len: self.school_number_len,
            });
        }
        if !has_min_chars(&input.admit_id, self.admit_id_min_len) {
            return Err(ValidationError::AdmitIdTooShort {
                min: self.admit_id_min_len,
            });
        }
        if !matches_code(&input.security_code, &self.security_code) {
            return Err(ValidationError::ChallengeMismatch {
                expected: self.security_code.clone(),
            });
        }
        Ok(())
    }
}

impl Default for GateRules {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}

/// The gated-reveal workflow.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    rules: GateRules,
    ids: GateIds,
    state: ViewState,
}

impl Gate {
    /// A locked gate.
    #[must_use]
    pub fn new(rules: GateRules, ids: GateIds) -> Self {
        Self {
            rules,
            ids,
            state: ViewState::Locked,
        }
    }

    /// Validate a submission and unlock on success.
    ///
    /// While revealed the form is hidden, so submissions are ignored.
    pub fn submit(&mut self, input: &CredentialInput) -> Result<(), ValidationError> {
        if self.is_revealed() {
            return Ok(());
        }
        self.rules.validate(input)?;
        self.state = ViewState::Revealed {
            roll_number: input.roll_number.clone(),
        };
        Ok(())
    }

    /// Return to the input view. Returns whether the gate was revealed.
    pub fn reset(&mut self) -> bool {
        let was_revealed = self.is_revealed();
        self.state = ViewState::Locked;
        was_revealed
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Whether the results are showing.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        matches!(self.state, ViewState::Revealed { .. })
    }

    /// Bound anchor ids.
    #[must_use]
    pub fn ids(&self) -> &GateIds {
        &self.ids
    }
}

impl Widget for Gate {
    fn render(&self, page: &mut Page) {
        let revealed = self.is_revealed();
        page.update(&self.ids.login_section, |n| n.show_if(!revealed, Display::Block));
        page.update(&self.ids.mark_sheet, |n| n.show_if(revealed, Display::Block));
        if let ViewState::Revealed { roll_number } = &self.state {
            page.update(&self.ids.display_roll, |n| n.set_text(roll_number.as_str()));
        }
    }
}
