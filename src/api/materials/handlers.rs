use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::uploads::read_upload_form;
use crate::core::state::AppState;
use crate::schemas::material::MaterialResponse;

pub(super) async fn upload_material(
    Path(course_id): Path<String>,
    CurrentUser(actor): CurrentUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    let max_bytes = state.settings().uploads().material.max_bytes();
    let form = read_upload_form(multipart, max_bytes).await?;

    let file = form.file.ok_or_else(|| ApiError::Invalid {
        field: "file",
        message: "File is required".to_string(),
    })?;

    let stored = state.workflow().upload_material(&actor, &course_id, file).await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}
