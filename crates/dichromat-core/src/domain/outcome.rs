//! Classification outcome for a full set of answers.

use serde::{Deserialize, Serialize};

use super::Dichromacy;

/// Overall screening status.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionStatus {
    /// Fewer than ten answers were supplied.
    Incomplete,
    /// The control plate was missed; other signals are ignored.
    Unreliable,
    /// No deficiency suspected.
    Normal,
    /// At least one deficiency suspected.
    Deficient,
}

/// How much weight to put on the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// No classification could be made.
    None,
    /// Conflicting signals.
    Low,
    /// Some evidence against the conclusion.
    Medium,
    /// Every relevant plate agrees.
    High,
}

/// The deficiency the respondent most likely has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspectedType {
    /// Red color blindness.
    Protanopia,
    /// Green color blindness.
    Deuteranopia,
    /// Blue color blindness.
    Tritanopia,
    /// More than one dichromacy met the suspicion threshold.
    Multiple,
}

impl From<Dichromacy> for SuspectedType {
    fn from(d: Dichromacy) -> Self {
        match d {
            Dichromacy::Protanopia => Self::Protanopia,
            Dichromacy::Deuteranopia => Self::Deuteranopia,
            Dichromacy::Tritanopia => Self::Tritanopia,
        }
    }
}

/// Number of wrong or missing answers per plate type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBreakdown {
    /// Errors on protanopia plates.
    pub protanopia_errors: u32,
    /// Errors on deuteranopia plates.
    pub deuteranopia_errors: u32,
    /// Errors on tritanopia plates.
    pub tritanopia_errors: u32,
    /// Errors on the control plate.
    pub control_errors: u32,
}

/// Result of classifying a session's answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Overall status.
    pub color_vision_status: VisionStatus,
    /// Suspected deficiency, only set when status is deficient.
    pub suspected_type: Option<SuspectedType>,
    /// Confidence in the status.
    pub confidence: Confidence,
    /// Per-type error counts; absent for incomplete sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorBreakdown>,
    /// What the result means.
    pub interpretation: String,
    /// What to do next, if anything.
    pub recommendations: Option<String>,
}

impl Outcome {
    /// Whether the outcome should be flagged to the respondent.
    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        matches!(
            self.color_vision_status,
            VisionStatus::Deficient | VisionStatus::Unreliable
        )
    }
}
