use sqlx::PgPool;

use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;

use super::types::{CreateSubmission, GradedUpdate, OverrideUpdate, COLUMNS};

/// Relies on `submissions_one_per_student`; a concurrent duplicate surfaces as a unique violation.
pub(crate) async fn insert(
    pool: &PgPool,
    params: CreateSubmission,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, assignment_id, student_id, content_text, file_url, status, submitted_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.assignment_id)
    .bind(params.student_id)
    .bind(params.content_text)
    .bind(params.file_url)
    .bind(SubmissionStatus::Pending)
    .bind(params.submitted_at)
    .fetch_one(pool)
    .await
}

/// Returns `None` when the row is missing or no longer pending.
pub(crate) async fn mark_graded(
    pool: &PgPool,
    submission_id: &str,
    params: GradedUpdate,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "UPDATE submissions
         SET status = $1,
             ai_score = $2,
             ai_feedback = $3,
             needs_attention = $4,
             attention_reason = $5,
             graded_at = $6
         WHERE id = $7 AND status = $8
         RETURNING {COLUMNS}"
    ))
    .bind(SubmissionStatus::Graded)
    .bind(params.ai_score)
    .bind(params.ai_feedback)
    .bind(params.needs_attention)
    .bind(params.attention_reason)
    .bind(params.graded_at)
    .bind(submission_id)
    .bind(SubmissionStatus::Pending)
    .fetch_optional(pool)
    .await
}

/// Leaves the AI columns untouched.
pub(crate) async fn apply_override(
    pool: &PgPool,
    submission_id: &str,
    params: OverrideUpdate,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "UPDATE submissions
         SET status = $1,
             manual_score = $2,
             manual_feedback = $3,
             reviewed_by = $4,
             reviewed_at = $5
         WHERE id = $6 AND status IN ($7, $8)
         RETURNING {COLUMNS}"
    ))
    .bind(SubmissionStatus::Reviewed)
    .bind(params.manual_score)
    .bind(params.manual_feedback)
    .bind(params.reviewed_by)
    .bind(params.reviewed_at)
    .bind(submission_id)
    .bind(SubmissionStatus::Graded)
    .bind(SubmissionStatus::Reviewed)
    .fetch_optional(pool)
    .await
}
