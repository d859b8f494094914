use time::PrimitiveDateTime;

pub(crate) const COLUMNS: &str = "\
    id, assignment_id, student_id, content_text, file_url, status, ai_score, ai_feedback, \
    manual_score, manual_feedback, reviewed_by, needs_attention, attention_reason, \
    submitted_at, graded_at, reviewed_at";

#[derive(Debug, Clone)]
pub(crate) struct CreateSubmission {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) student_id: String,
    pub(crate) content_text: Option<String>,
    pub(crate) file_url: Option<String>,
    pub(crate) submitted_at: PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub(crate) struct GradedUpdate {
    pub(crate) ai_score: i32,
    pub(crate) ai_feedback: String,
    pub(crate) needs_attention: bool,
    pub(crate) attention_reason: Option<String>,
    pub(crate) graded_at: PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub(crate) struct OverrideUpdate {
    pub(crate) manual_score: i32,
    pub(crate) manual_feedback: String,
    pub(crate) reviewed_by: String,
    pub(crate) reviewed_at: PrimitiveDateTime,
}
