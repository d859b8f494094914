use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{Assignment, Course, Profile, Submission};
use crate::db::types::SubmissionStatus;
use crate::repositories::submissions::{CreateSubmission, GradedUpdate, OverrideUpdate};
use crate::services::grading_function::{GradingFailure, GradingRequest, GradingResponse};

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Duplicate,
    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

/// Persistence for assignments, submissions and profiles.
#[async_trait]
pub(crate) trait WorkflowStore: Send + Sync {
    async fn find_profile(&self, profile_id: &str) -> Result<Option<Profile>, StoreError>;

    async fn find_course(&self, course_id: &str) -> Result<Option<Course>, StoreError>;

    async fn find_assignment(&self, assignment_id: &str)
        -> Result<Option<Assignment>, StoreError>;

    async fn find_submission(&self, submission_id: &str)
        -> Result<Option<Submission>, StoreError>;

    async fn find_submission_for_student(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>, StoreError>;

    /// Must fail with [`StoreError::Duplicate`] when (assignment, student) already exists.
    async fn insert_submission(&self, params: CreateSubmission) -> Result<Submission, StoreError>;

    /// Applies only to a `pending` row; `None` otherwise.
    async fn mark_graded(
        &self,
        submission_id: &str,
        params: GradedUpdate,
    ) -> Result<Option<Submission>, StoreError>;

    /// Applies only to a `graded` or `reviewed` row; `None` otherwise.
    async fn apply_override(
        &self,
        submission_id: &str,
        params: OverrideUpdate,
    ) -> Result<Option<Submission>, StoreError>;

    async fn list_by_assignment(&self, assignment_id: &str)
        -> Result<Vec<Submission>, StoreError>;

    async fn list_by_student(&self, student_id: &str) -> Result<Vec<Submission>, StoreError>;

    async fn list_for_lecturer(
        &self,
        lecturer_id: &str,
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredObject {
    pub(crate) key: String,
    pub(crate) url: String,
    pub(crate) size: i64,
    pub(crate) sha256: String,
}

#[async_trait]
pub(crate) trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<StoredObject>;

    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub(crate) trait GradingFunction: Send + Sync {
    async fn grade(&self, request: &GradingRequest) -> Result<GradingResponse, GradingFailure>;
}
