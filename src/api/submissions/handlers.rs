use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::uploads::read_upload_form;
use crate::core::state::AppState;
use crate::schemas::submission::{
    GradeOverrideRequest, GradeResponse, SubmissionCreateRequest, SubmissionResponse,
    SubmitResponse,
};
use crate::services::workflow::{GradeSummary, ManualGrade, SubmissionDraft};

/// Accepts either a JSON body or a multipart form with `content_text` and `file`.
pub(super) async fn create_submission(
    Path(assignment_id): Path<String>,
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let draft = read_draft(&state, request).await?;
    let outcome = state.workflow().submit_and_grade(&actor, &assignment_id, draft).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

pub(super) async fn list_assignment_submissions(
    Path(assignment_id): Path<String>,
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = state.workflow().list_for_assignment(&actor, &assignment_id).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

pub(super) async fn my_assignment_submission(
    Path(assignment_id): Path<String>,
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = state
        .workflow()
        .submission_for_student(&actor, &assignment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No submission for this assignment yet".to_string()))?;
    Ok(Json(submission.into()))
}

pub(super) async fn assignment_summary(
    Path(assignment_id): Path<String>,
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<GradeSummary>, ApiError> {
    Ok(Json(state.workflow().assignment_summary(&actor, &assignment_id).await?))
}

pub(super) async fn get_submission(
    Path(submission_id): Path<String>,
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = state.workflow().get_submission(&actor, &submission_id).await?;
    Ok(Json(submission.into()))
}

/// Retries grading for a submission that is still pending.
pub(super) async fn grade_submission(
    Path(submission_id): Path<String>,
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<GradeResponse>, ApiError> {
    let outcome = state.workflow().grade(&actor, &submission_id).await?;
    Ok(Json(outcome.into()))
}

pub(super) async fn override_grade(
    Path(submission_id): Path<String>,
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<GradeOverrideRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let grade = ManualGrade { score: payload.score, feedback: payload.feedback };
    let submission = state.workflow().override_grade(&actor, &submission_id, grade).await?;
    Ok(Json(submission.into()))
}

pub(super) async fn my_submissions(
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = state.workflow().list_for_student(&actor).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

pub(super) async fn review_queue(
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = state.workflow().pending_for_lecturer(&actor).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

async fn read_draft(state: &AppState, request: Request) -> Result<SubmissionDraft, ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?;
        let max_bytes = state.settings().uploads().submission.max_bytes();
        let form = read_upload_form(multipart, max_bytes).await?;
        return Ok(SubmissionDraft { content_text: form.content_text, file: form.file });
    }

    let Json(payload) = Json::<SubmissionCreateRequest>::from_request(request, state)
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(SubmissionDraft { content_text: payload.content_text, file: None })
}
