use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{ProfileRole, SubmissionStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Profile {
    pub(crate) id: String,
    pub(crate) full_name: String,
    pub(crate) email: Option<String>,
    pub(crate) role: ProfileRole,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) lecturer_id: String,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Assignment row joined with the lecturer who owns its course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Assignment {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) lecturer_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) max_score: i32,
    pub(crate) rubric: Option<String>,
    pub(crate) allow_file_upload: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
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
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) graded_at: Option<PrimitiveDateTime>,
    pub(crate) reviewed_at: Option<PrimitiveDateTime>,
}
