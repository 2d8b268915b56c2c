//! Classification of a finished session.
//!
//! Thresholds are compared as exact fractions: a type is suspected at two
//! or more wrong answers out of three.

use crate::domain::{
    AnswerRecord, Confidence, DeficiencyType, Dichromacy, ErrorBreakdown, ImageIndex, Outcome,
    SuspectedType, VisionStatus,
};

const INCOMPLETE: &str = "Test incomplete. Please answer all 10 images.";
const UNRELIABLE: &str = "Test results are unreliable. The control image was answered \
    incorrectly, which may indicate random guessing, visual impairment, or poor viewing conditions.";
const UNRELIABLE_ADVICE: &str =
    "Please retake the test in proper lighting conditions, ensuring you can see the screen clearly.";
const NORMAL: &str = "Your color vision appears to be normal. You were able to correctly \
    identify numbers across all color combinations tested.";
const NORMAL_ADVICE: &str =
    "No further action needed. Your color perception is within normal range.";
const DEFICIENT_ADVICE: &str = "Consider consulting an eye care professional for comprehensive \
    color vision testing. This screening test is not a medical diagnosis.";
const MULTIPLE_ADVICE: &str = "Please consult an eye care professional for comprehensive color \
    vision testing to determine the specific nature of your color vision.";

/// Wrong answers out of plates seen, for one type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    errors: u32,
    total: u32,
}

impl Tally {
    /// At least two thirds wrong.
    const fn suspected(self) -> bool {
        self.total > 0 && 3 * self.errors >= 2 * self.total
    }

    /// Error rate at most 0.33.
    const fn low(self) -> bool {
        100 * self.errors <= 33 * self.total
    }

    const fn complete_miss(self) -> bool {
        self.total > 0 && self.errors == self.total
    }
}

#[derive(Debug, Default)]
struct Tallies {
    protanopia: Tally,
    deuteranopia: Tally,
    tritanopia: Tally,
    control: Tally,
}

impl Tallies {
    fn from_records(records: &[AnswerRecord]) -> Self {
        let mut tallies = Self::default();
        for record in records {
            let tally = match record.deficiency_type {
                DeficiencyType::PROTANOPIA => &mut tallies.protanopia,
                DeficiencyType::DEUTERANOPIA => &mut tallies.deuteranopia,
                DeficiencyType::TRITANOPIA => &mut tallies.tritanopia,
                DeficiencyType::Control => &mut tallies.control,
            };
            tally.total += 1;
            if !record.is_correct() {
                tally.errors += 1;
            }
        }
        tallies
    }

    const fn of(&self, d: Dichromacy) -> Tally {
        match d {
            Dichromacy::Protanopia => self.protanopia,
            Dichromacy::Deuteranopia => self.deuteranopia,
            Dichromacy::Tritanopia => self.tritanopia,
        }
    }

    const fn breakdown(&self) -> ErrorBreakdown {
        ErrorBreakdown {
            protanopia_errors: self.protanopia.errors,
            deuteranopia_errors: self.deuteranopia.errors,
            tritanopia_errors: self.tritanopia.errors,
            control_errors: self.control.errors,
        }
    }
}

/// Classifies a session's answers.
///
/// Never fails: any record count other than ten is reported as
/// [`VisionStatus::Incomplete`]. A missed control plate overrides every
/// other signal. Sessions without a control record are treated as passing
/// the control check.
#[must_use]
pub fn classify(records: &[AnswerRecord]) -> Outcome {
    if records.len() != usize::from(ImageIndex::MAX) {
        tracing::debug!(records = records.len(), "session incomplete");
        return Outcome {
            color_vision_status: VisionStatus::Incomplete,
            suspected_type: None,
            confidence: Confidence::None,
            details: None,
            interpretation: INCOMPLETE.to_string(),
            recommendations: None,
        };
    }

    let tallies = Tallies::from_records(records);
    let details = Some(tallies.breakdown());

    if tallies.control.errors > 0 {
        return Outcome {
            color_vision_status: VisionStatus::Unreliable,
            suspected_type: None,
            confidence: Confidence::None,
            details,
            interpretation: UNRELIABLE.to_string(),
            recommendations: Some(UNRELIABLE_ADVICE.to_string()),
        };
    }

    let suspected: Vec<Dichromacy> = Dichromacy::ALL
        .into_iter()
        .filter(|&d| tallies.of(d).suspected())
        .collect();

    match suspected.as_slice() {
        [] => {
            let all_low = Dichromacy::ALL.into_iter().all(|d| tallies.of(d).low());
            Outcome {
                color_vision_status: VisionStatus::Normal,
                suspected_type: None,
                confidence: if all_low {
                    Confidence::High
                } else {
                    Confidence::Medium
                },
                details,
                interpretation: NORMAL.to_string(),
                recommendations: Some(NORMAL_ADVICE.to_string()),
            }
        }
        [only] => {
            let tally = tallies.of(*only);
            Outcome {
                color_vision_status: VisionStatus::Deficient,
                suspected_type: Some((*only).into()),
                confidence: if tally.complete_miss() {
                    Confidence::High
                } else {
                    Confidence::Medium
                },
                details,
                interpretation: format!(
                    "Results suggest {}. You had difficulty identifying numbers in {} of {} \
                     images designed to detect this condition.",
                    only.description(),
                    tally.errors,
                    tally.total
                ),
                recommendations: Some(DEFICIENT_ADVICE.to_string()),
            }
        }
        several => {
            let names: Vec<&str> = several.iter().map(|d| d.as_str()).collect();
            Outcome {
                color_vision_status: VisionStatus::Deficient,
                suspected_type: Some(SuspectedType::Multiple),
                confidence: Confidence::Low,
                details,
                interpretation: format!(
                    "Results suggest possible color vision deficiency affecting multiple color \
                     ranges ({}). This pattern is uncommon.",
                    names.join(", ")
                ),
                recommendations: Some(MULTIPLE_ADVICE.to_string()),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Ten records in schedule order; `wrong` lists 1-based indices answered incorrectly.
    fn session(wrong: &[u8]) -> Vec<AnswerRecord> {
        (1..=10u8)
            .map(|i| {
                let t = match i {
                    1..=3 => DeficiencyType::PROTANOPIA,
                    4..=6 => DeficiencyType::DEUTERANOPIA,
                    7..=9 => DeficiencyType::TRITANOPIA,
                    _ => DeficiencyType::Control,
                };
                let answer = if wrong.contains(&i) { 99 } else { 12 };
                AnswerRecord::new(ImageIndex::new(i.into()).unwrap(), t, 12, Some(answer))
            })
            .collect()
    }

    #[test]
    fn test_two_of_three_is_suspected() {
        let outcome = classify(&session(&[1, 2]));
        assert_eq!(outcome.color_vision_status, VisionStatus::Deficient);
        assert_eq!(outcome.suspected_type, Some(SuspectedType::Protanopia));
        assert_eq!(outcome.confidence, Confidence::Medium);
        assert_eq!(outcome.details.unwrap().protanopia_errors, 2);
        assert!(outcome.interpretation.contains("2 of 3"));
    }

    #[test]
    fn test_three_of_three_is_high_confidence() {
        let outcome = classify(&session(&[7, 8, 9]));
        assert_eq!(outcome.suspected_type, Some(SuspectedType::Tritanopia));
        assert_eq!(outcome.confidence, Confidence::High);
        assert!(outcome.interpretation.contains("tritanopia (blue color blindness)"));
    }

    #[test]
    fn test_all_correct_is_normal_high() {
        let outcome = classify(&session(&[]));
        assert_eq!(outcome.color_vision_status, VisionStatus::Normal);
        assert_eq!(outcome.suspected_type, None);
        assert_eq!(outcome.confidence, Confidence::High);
        assert_eq!(outcome.details, Some(ErrorBreakdown::default()));
    }

    #[test]
    fn test_one_miss_is_normal_medium() {
        // 1/3 is above 0.33.
        let outcome = classify(&session(&[4]));
        assert_eq!(outcome.color_vision_status, VisionStatus::Normal);
        assert_eq!(outcome.confidence, Confidence::Medium);
    }

    #[test]
    fn test_control_wrong_is_unreliable() {
        let outcome = classify(&session(&[10]));
        assert_eq!(outcome.color_vision_status, VisionStatus::Unreliable);
        assert_eq!(outcome.confidence, Confidence::None);
        assert_eq!(outcome.suspected_type, None);
        assert_eq!(outcome.details.unwrap().control_errors, 1);

        // Overrides everything else.
        let outcome = classify(&session(&[1, 2, 3, 4, 5, 6, 10]));
        assert_eq!(outcome.color_vision_status, VisionStatus::Unreliable);
    }

    #[test]
    fn test_missing_control_answer_is_unreliable() {
        let mut records = session(&[]);
        records[9].user_answer = None;
        assert_eq!(classify(&records).color_vision_status, VisionStatus::Unreliable);
    }

    #[test]
    fn test_multiple_is_low() {
        let outcome = classify(&session(&[1, 2, 3, 4, 5, 6]));
        assert_eq!(outcome.color_vision_status, VisionStatus::Deficient);
        assert_eq!(outcome.suspected_type, Some(SuspectedType::Multiple));
        assert_eq!(outcome.confidence, Confidence::Low);
        assert!(outcome.interpretation.contains("protanopia, deuteranopia"));
    }

    #[test]
    fn test_incomplete() {
        let mut records = session(&[1, 2, 3]);
        records.truncate(9);
        let outcome = classify(&records);
        assert_eq!(outcome.color_vision_status, VisionStatus::Incomplete);
        assert_eq!(outcome.confidence, Confidence::None);
        assert_eq!(outcome.details, None);
        assert_eq!(classify(&[]).color_vision_status, VisionStatus::Incomplete);
    }

    #[test]
    fn test_eleven_records_is_incomplete() {
        // Without the extra answer this session is deficient/protanopia.
        let mut records = session(&[1, 2]);
        records.push(AnswerRecord::new(
            ImageIndex::new(3).unwrap(),
            DeficiencyType::PROTANOPIA,
            12,
            Some(12),
        ));
        let outcome = classify(&records);
        assert_eq!(outcome.color_vision_status, VisionStatus::Incomplete);
        assert_eq!(outcome.suspected_type, None);
        assert_eq!(outcome.details, None);
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(classify(&session(&[1, 2, 3, 4, 5, 6]))).unwrap();
        assert_eq!(json["color_vision_status"], "deficient");
        assert_eq!(json["suspected_type"], "multiple");
        assert_eq!(json["confidence"], "low");
        assert_eq!(json["details"]["deuteranopia_errors"], 3);
    }
}
