use std::fmt;

use serde::Serialize;

use crate::services::grading_function::GradingResponse;

/// Something the grading function returned that breaks its contract but is still stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum GradingContractViolation {
    ScoreOutOfRange { score: i32, max_score: i32 },
    FractionalScore { raw: f64 },
    EmptyFeedback,
}

impl fmt::Display for GradingContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScoreOutOfRange { score, max_score } => {
                write!(f, "AI score {score} is outside 0..={max_score}")
            }
            Self::FractionalScore { raw } => write!(f, "AI score {raw} is not an integer"),
            Self::EmptyFeedback => f.write_str("AI feedback is empty"),
        }
    }
}

/// A grading response reduced to what gets stored, plus anything the lecturer should see.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct AssessedGrade {
    pub(super) score: i32,
    pub(super) feedback: String,
    pub(super) violations: Vec<GradingContractViolation>,
}

impl AssessedGrade {
    pub(super) fn attention_reason(&self) -> Option<String> {
        if self.violations.is_empty() {
            return None;
        }
        Some(self.violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
    }
}

/// Scores are stored as returned (rounded to an integer), never clamped.
pub(super) fn assess(response: &GradingResponse, max_score: i32) -> AssessedGrade {
    let mut violations = Vec::new();

    let rounded = response.score.round();
    if rounded != response.score {
        violations.push(GradingContractViolation::FractionalScore { raw: response.score });
    }
    let score = rounded.clamp(i32::MIN as f64, i32::MAX as f64) as i32;

    if !(0..=max_score).contains(&score) {
        violations.push(GradingContractViolation::ScoreOutOfRange { score, max_score });
    }

    if response.feedback.trim().is_empty() {
        violations.push(GradingContractViolation::EmptyFeedback);
    }

    AssessedGrade { score, feedback: response.feedback.clone(), violations }
}
