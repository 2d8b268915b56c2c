//! Answer records submitted for a session.

use serde::{Deserialize, Serialize};

use super::{DeficiencyType, ImageIndex};

/// One answered (or skipped) plate.
///
/// Created once per plate index per session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Plate position in the session.
    #[serde(rename = "image_number")]
    pub image_index: ImageIndex,
    /// What the plate was designed to screen for.
    #[serde(rename = "dichromism_type")]
    pub deficiency_type: DeficiencyType,
    /// The number hidden in the plate.
    pub correct_answer: u8,
    /// What the respondent entered, if anything.
    #[serde(default)]
    pub user_answer: Option<u8>,
}

impl AnswerRecord {
    /// Creates a new answer record.
    #[must_use]
    pub const fn new(
        image_index: ImageIndex,
        deficiency_type: DeficiencyType,
        correct_answer: u8,
        user_answer: Option<u8>,
    ) -> Self {
        Self {
            image_index,
            deficiency_type,
            correct_answer,
            user_answer,
        }
    }

    /// An absent answer is never correct.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.user_answer == Some(self.correct_answer)
    }
}
