use serde::Serialize;

use crate::db::models::Submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum GradeSource {
    None,
    Ai,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct EffectiveGrade {
    pub(crate) score: Option<i32>,
    pub(crate) feedback: Option<String>,
    pub(crate) source: GradeSource,
}

/// The grade shown and aggregated for a submission: manual over AI over nothing.
///
/// Every display and aggregate goes through here so that "the grade" has exactly one
/// definition. Score and feedback fall back independently.
pub(crate) fn effective_grade(submission: &Submission) -> EffectiveGrade {
    let source = if submission.manual_score.is_some() {
        GradeSource::Manual
    } else if submission.ai_score.is_some() {
        GradeSource::Ai
    } else {
        GradeSource::None
    };

    EffectiveGrade {
        score: submission.manual_score.or(submission.ai_score),
        feedback: submission.manual_feedback.clone().or_else(|| submission.ai_feedback.clone()),
        source,
    }
}
