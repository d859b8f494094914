use time::{Duration, PrimitiveDateTime};

use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;

use super::errors::WorkflowError;

/// Actions that move a submission between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Transition {
    /// `pending -> graded`, system initiated after a successful grading call.
    Grade,
    /// `graded | reviewed -> reviewed`, lecturer initiated.
    Override,
}

impl Transition {
    pub(super) fn action(self) -> &'static str {
        match self {
            Self::Grade => "grade",
            Self::Override => "override",
        }
    }

    pub(super) fn target(self) -> SubmissionStatus {
        match self {
            Self::Grade => SubmissionStatus::Graded,
            Self::Override => SubmissionStatus::Reviewed,
        }
    }

    fn allowed_from(self, from: SubmissionStatus) -> bool {
        match self {
            Self::Grade => from == SubmissionStatus::Pending,
            Self::Override => matches!(from, SubmissionStatus::Graded | SubmissionStatus::Reviewed),
        }
    }
}

pub(super) fn ensure_transition(
    from: SubmissionStatus,
    transition: Transition,
) -> Result<SubmissionStatus, WorkflowError> {
    if transition.allowed_from(from) {
        Ok(transition.target())
    } else {
        Err(WorkflowError::InvalidTransition { from, action: transition.action() })
    }
}

/// Status/score consistency: pending has no AI score, graded has one, reviewed has a manual one.
pub(crate) fn is_consistent(submission: &Submission) -> bool {
    match submission.status {
        SubmissionStatus::Pending => submission.ai_score.is_none(),
        SubmissionStatus::Graded => submission.ai_score.is_some(),
        SubmissionStatus::Reviewed => submission.manual_score.is_some(),
    }
}

/// Keeps `reviewed_at` strictly increasing across repeated overrides.
pub(super) fn next_reviewed_at(
    now: PrimitiveDateTime,
    previous: Option<PrimitiveDateTime>,
) -> PrimitiveDateTime {
    match previous {
        Some(previous) if previous >= now => previous + Duration::microseconds(1),
        _ => now,
    }
}
