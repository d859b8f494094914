use axum::extract::Multipart;

use crate::api::errors::ApiError;
use crate::services::workflow::FileUpload;

/// Text and file fields of a submission or material form.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub(crate) content_text: Option<String>,
    pub(crate) file: Option<FileUpload>,
}

/// Reads at most `max_bytes + 1` bytes of the file so an oversized upload is still
/// rejected by the size check without buffering all of it.
pub(crate) async fn read_upload_form(
    mut multipart: Multipart,
    max_bytes: u64,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        match field.name().unwrap_or("") {
            "content_text" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest("Invalid content_text".to_string()))?;
                form.content_text = Some(text);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
                {
                    bytes.extend_from_slice(&chunk);
                    if bytes.len() as u64 > max_bytes {
                        break;
                    }
                }

                // Browsers send an empty, unnamed part when no file was chosen.
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                let filename = if filename.is_empty() { "upload".to_string() } else { filename };
                form.file = Some(FileUpload { filename, content_type, bytes });
            }
            _ => {}
        }
    }

    Ok(form)
}
