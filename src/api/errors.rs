use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::workflow::{GradingUnavailableKind, WorkflowError};

const AI_PERMISSION_GUIDANCE: &str =
    "AI grading is not enabled for your account. Your submission is saved; ask your lecturer \
     or an administrator to enable AI features, or wait for manual grading.";
const GRADING_RETRY_GUIDANCE: &str =
    "Grading did not complete. Your submission is saved and grading can be retried later.";

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    Invalid { field: &'static str, message: String },
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    fn parts(self) -> (StatusCode, String, Option<&'static str>) {
        match self {
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.to_string(), None),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message.to_string(), None),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            ApiError::Invalid { field, message } => (StatusCode::BAD_REQUEST, message, Some(field)),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message, None),
            ApiError::BadGateway(message) => {
                tracing::warn!(error = %message, "Upstream storage failure");
                (StatusCode::BAD_GATEWAY, message, None)
            }
            ApiError::ServiceUnavailable(message) => {
                tracing::warn!(error = %message, "Service unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, message, None)
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let unauthorized = matches!(self, ApiError::Unauthorized(_));
        let (status, detail, field) = self.parts();

        let mut response =
            (status, Json(ErrorResponse { status: status.as_u16(), detail, field })).into_response();
        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(invalid) => {
                ApiError::Invalid { field: invalid.field, message: invalid.message }
            }
            WorkflowError::DuplicateSubmission { .. } => {
                ApiError::Conflict("You have already submitted this assignment".to_string())
            }
            err @ WorkflowError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            WorkflowError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            WorkflowError::Forbidden(message) => ApiError::Forbidden(message),
            WorkflowError::GradingUnavailable { kind: GradingUnavailableKind::AuthRequired, .. } => {
                ApiError::Forbidden(AI_PERMISSION_GUIDANCE)
            }
            WorkflowError::GradingUnavailable { .. } => {
                ApiError::ServiceUnavailable(GRADING_RETRY_GUIDANCE.to_string())
            }
            WorkflowError::Upload(message) => {
                ApiError::BadGateway(format!("File upload failed: {message}"))
            }
            WorkflowError::Persistence(err) => {
                ApiError::internal(err, "Failed to access submission records")
            }
        }
    }
}

/// Guidance shown next to a failed grading attempt inside an otherwise successful response.
pub(crate) fn grading_guidance(kind: GradingUnavailableKind) -> &'static str {
    match kind {
        GradingUnavailableKind::AuthRequired => AI_PERMISSION_GUIDANCE,
        GradingUnavailableKind::Timeout | GradingUnavailableKind::Service => GRADING_RETRY_GUIDANCE,
    }
}
