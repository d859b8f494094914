use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::errors::grading_guidance;
use crate::core::time::format_primitive;
use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;
use crate::services::workflow::{
    effective_grade, EffectiveGrade, GradeOutcome, GradingAttempt, GradingContractViolation,
    GradingUnavailableKind, SubmitOutcome, WorkflowError,
};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmissionCreateRequest {
    #[serde(default)]
    #[validate(length(max = 100000, message = "content_text is too long"))]
    pub(crate) content_text: Option<String>,
}

/// Range and blank checks happen in the workflow so every failure carries its field.
#[derive(Debug, Deserialize)]
pub(crate) struct GradeOverrideRequest {
    pub(crate) score: i32,
    pub(crate) feedback: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) student_id: String,
    pub(crate) content_text: Option<String>,
    pub(crate) file_url: Option<String>,
    pub(crate) status: SubmissionStatus,
    pub(crate) ai_score: Option<i32>,
    pub(crate) ai_feedback: Option<String>,
    pub(crate) manual_score: Option<i32>,
    pub(crate) manual_feedback: Option<String>,
    pub(crate) reviewed_by: Option<String>,
    pub(crate) needs_attention: bool,
    pub(crate) attention_reason: Option<String>,
    pub(crate) submitted_at: String,
    pub(crate) graded_at: Option<String>,
    pub(crate) reviewed_at: Option<String>,
    pub(crate) effective: EffectiveGrade,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        let effective = effective_grade(&submission);
        Self {
            id: submission.id,
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            content_text: submission.content_text,
            file_url: submission.file_url,
            status: submission.status,
            ai_score: submission.ai_score,
            ai_feedback: submission.ai_feedback,
            manual_score: submission.manual_score,
            manual_feedback: submission.manual_feedback,
            reviewed_by: submission.reviewed_by,
            needs_attention: submission.needs_attention,
            attention_reason: submission.attention_reason,
            submitted_at: format_primitive(submission.submitted_at),
            graded_at: submission.graded_at.map(format_primitive),
            reviewed_at: submission.reviewed_at.map(format_primitive),
            effective,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum GradingStatusResponse {
    Graded {
        violations: Vec<GradingContractViolation>,
    },
    Failed {
        kind: Option<GradingUnavailableKind>,
        retryable: bool,
        detail: String,
        guidance: Option<&'static str>,
    },
}

impl From<GradingAttempt> for GradingStatusResponse {
    fn from(attempt: GradingAttempt) -> Self {
        match attempt {
            GradingAttempt::Graded { violations } => Self::Graded { violations },
            GradingAttempt::Failed(err) => {
                let kind = match &err {
                    WorkflowError::GradingUnavailable { kind, .. } => Some(*kind),
                    _ => None,
                };
                Self::Failed {
                    kind,
                    retryable: err.is_retryable(),
                    detail: err.to_string(),
                    guidance: kind.map(grading_guidance),
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) submission: SubmissionResponse,
    pub(crate) grading: GradingStatusResponse,
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self { submission: outcome.submission.into(), grading: outcome.grading.into() }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeResponse {
    pub(crate) submission: SubmissionResponse,
    pub(crate) violations: Vec<GradingContractViolation>,
}

impl From<GradeOutcome> for GradeResponse {
    fn from(outcome: GradeOutcome) -> Self {
        Self { submission: outcome.submission.into(), violations: outcome.violations }
    }
}
