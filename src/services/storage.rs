use anyhow::Context;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::core::config::Settings;
use crate::services::workflow::{ObjectStore, StoredObject};

#[derive(Debug, Clone)]
pub(crate) struct StorageService {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl StorageService {
    /// `None` when S3 credentials are not configured; uploads then fail as upload errors.
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        if !settings.s3().is_configured() {
            return Ok(None);
        }

        let creds = Credentials::new(
            settings.s3().access_key.clone(),
            settings.s3().secret_key.clone(),
            None,
            None,
            "gradeflow-static",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(settings.s3().endpoint.clone())
            .region(aws_config::Region::new(settings.s3().region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config).force_path_style(true).build();
        let client = Client::from_conf(s3_config);

        Ok(Some(Self {
            client,
            bucket: settings.s3().bucket.clone(),
            public_base_url: settings.s3().public_base_url(),
        }))
    }

    pub(crate) fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl ObjectStore for StorageService {
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<StoredObject> {
        let size = bytes.len() as i64;
        let sha256 = hex::encode(Sha256::digest(&bytes));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .with_context(|| format!("Failed to store object {key}"))?;

        Ok(StoredObject { key: key.to_string(), url: self.public_url(key), size, sha256 })
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to delete object {key}"))?;
        Ok(())
    }
}

/// `submissions/{student_id}/{folder}/{random}_{filename}`; the random part keeps
/// a same-name re-upload from overwriting an earlier object.
pub(crate) fn submission_object_key(student_id: &str, folder: &str, filename: &str) -> String {
    format!(
        "submissions/{}/{}/{}_{}",
        sanitized_segment(student_id),
        sanitized_segment(folder),
        Uuid::new_v4().simple(),
        sanitized_filename(filename)
    )
}

pub(crate) fn material_object_key(course_id: &str, filename: &str) -> String {
    format!(
        "materials/{}/{}_{}",
        sanitized_segment(course_id),
        Uuid::new_v4().simple(),
        sanitized_filename(filename)
    )
}

pub(crate) fn sanitized_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
        .collect();

    let trimmed = sanitized.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

fn sanitized_segment(value: &str) -> String {
    let sanitized: String =
        value.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-').collect();
    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}
