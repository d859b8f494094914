use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::db::types::SubmissionStatus;

use super::ports::StoreError;

/// Bad input shape. Never persisted; reported against the offending field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub(crate) struct ValidationError {
    pub(crate) field: &'static str,
    pub(crate) message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum GradingUnavailableKind {
    Timeout,
    /// The actor is not allowed to use AI grading.
    AuthRequired,
    Service,
}

impl GradingUnavailableKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::AuthRequired => "auth_required",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for GradingUnavailableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub(crate) enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("student {student_id} already submitted assignment {assignment_id}")]
    DuplicateSubmission { assignment_id: String, student_id: String },
    #[error("file upload failed: {0}")]
    Upload(String),
    #[error("grading did not complete ({kind}): {detail}")]
    GradingUnavailable { kind: GradingUnavailableKind, detail: String },
    #[error("cannot {action} a submission that is {from}")]
    InvalidTransition { from: SubmissionStatus, action: &'static str },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("persistence failure: {0}")]
    Persistence(#[source] StoreError),
}

impl WorkflowError {
    #[cfg(test)]
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, message))
    }

    /// Whether the caller may retry the same operation without changing its input.
    /// A missing AI permission needs an administrator first.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::GradingUnavailable { kind, .. } => *kind != GradingUnavailableKind::AuthRequired,
            Self::Upload(_) | Self::Persistence(_) => true,
            _ => false,
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_follows_error_kind() {
        assert!(WorkflowError::Upload("bucket down".into()).is_retryable());
        assert!(WorkflowError::GradingUnavailable {
            kind: GradingUnavailableKind::Timeout,
            detail: "slow".into()
        }
        .is_retryable());
        assert!(WorkflowError::Persistence(StoreError::Backend(sqlx::Error::PoolTimedOut))
            .is_retryable());

        assert!(!WorkflowError::validation("content_text", "empty").is_retryable());
        assert!(!WorkflowError::DuplicateSubmission {
            assignment_id: "a".into(),
            student_id: "s".into()
        }
        .is_retryable());
        assert!(!WorkflowError::InvalidTransition {
            from: SubmissionStatus::Pending,
            action: "override"
        }
        .is_retryable());
        assert!(!WorkflowError::Forbidden("no").is_retryable());
        assert!(!WorkflowError::GradingUnavailable {
            kind: GradingUnavailableKind::AuthRequired,
            detail: "AI features disabled".into()
        }
        .is_retryable());
        assert!(!WorkflowError::NotFound("Submission").is_retryable());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = WorkflowError::validation("manual_score", "must be between 0 and 100");
        assert_eq!(err.to_string(), "manual_score: must be between 0 and 100");

        let err = WorkflowError::InvalidTransition {
            from: SubmissionStatus::Pending,
            action: "override",
        };
        assert_eq!(err.to_string(), "cannot override a submission that is pending");
    }
}
