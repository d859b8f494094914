use crate::core::config::UploadLimit;
use crate::db::models::Assignment;

use super::errors::ValidationError;

/// What a student hands in: free text, a file, or both.
#[derive(Debug, Clone, Default)]
pub(crate) struct SubmissionDraft {
    pub(crate) content_text: Option<String>,
    pub(crate) file: Option<FileUpload>,
}

#[derive(Debug, Clone)]
pub(crate) struct FileUpload {
    pub(crate) filename: String,
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub(crate) struct ManualGrade {
    pub(crate) score: i32,
    pub(crate) feedback: String,
}

/// A draft that passed intake. Text is kept verbatim; whitespace-only text becomes `None`.
#[derive(Debug, Clone)]
pub(super) struct ValidatedDraft {
    pub(super) content_text: Option<String>,
    pub(super) file: Option<ValidatedFile>,
}

#[derive(Debug, Clone)]
pub(super) struct ValidatedFile {
    pub(super) filename: String,
    pub(super) content_type: String,
    pub(super) bytes: Vec<u8>,
}

pub(super) fn validate_draft(
    draft: SubmissionDraft,
    assignment: &Assignment,
    limit: &UploadLimit,
) -> Result<ValidatedDraft, ValidationError> {
    let content_text = draft.content_text.filter(|text| !text.trim().is_empty());

    let file = match draft.file {
        Some(file) => {
            if !assignment.allow_file_upload {
                return Err(ValidationError::new(
                    "file",
                    "this assignment does not accept file uploads",
                ));
            }
            Some(validate_file(file, limit, "file")?)
        }
        None => None,
    };

    if content_text.is_none() && file.is_none() {
        return Err(ValidationError::new(
            "content_text",
            "provide an answer text or attach a file",
        ));
    }

    Ok(ValidatedDraft { content_text, file })
}

/// Course materials use their own limit and allow-list.
pub(super) fn validate_material(
    file: FileUpload,
    limit: &UploadLimit,
) -> Result<ValidatedFile, ValidationError> {
    validate_file(file, limit, "file")
}

pub(super) fn validate_manual_grade(
    grade: &ManualGrade,
    assignment: &Assignment,
) -> Result<(), ValidationError> {
    if grade.score < 0 || grade.score > assignment.max_score {
        return Err(ValidationError::new(
            "score",
            format!("must be between 0 and {}", assignment.max_score),
        ));
    }
    if grade.feedback.trim().is_empty() {
        return Err(ValidationError::new("feedback", "must not be empty"));
    }
    Ok(())
}

fn validate_file(
    file: FileUpload,
    limit: &UploadLimit,
    field: &'static str,
) -> Result<ValidatedFile, ValidationError> {
    if file.bytes.is_empty() {
        return Err(ValidationError::new(field, "file is empty"));
    }

    let content_type = normalize_mime(&file.content_type);
    if !limit.allowed_mime_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(&content_type)) {
        return Err(ValidationError::new(
            field,
            format!("file type {content_type} is not accepted"),
        ));
    }

    if file.bytes.len() as u64 > limit.max_bytes() {
        return Err(ValidationError::new(
            field,
            format!("file exceeds the {} MB limit", limit.max_size_mb),
        ));
    }

    Ok(ValidatedFile { filename: file.filename, content_type, bytes: file.bytes })
}

/// `Application/PDF; name=x` -> `application/pdf`.
fn normalize_mime(value: &str) -> String {
    value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
