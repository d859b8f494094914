use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::config::GradingSettings;
use crate::services::workflow::GradingFunction;

/// Request body of the grading function.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GradingRequest {
    pub(crate) assignment_title: String,
    pub(crate) assignment_context: String,
    pub(crate) student_answer: String,
    pub(crate) max_score: i32,
}

/// Successful response body. `score` is a JSON number and is not trusted to be an integer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GradingResponse {
    pub(crate) score: f64,
    #[serde(default)]
    pub(crate) feedback: String,
    #[serde(default)]
    pub(crate) processing_time_ms: Option<u64>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub(crate) enum GradingFailure {
    /// The caller is not permitted to use AI grading.
    #[error("not permitted to use AI grading: {0}")]
    Unauthorized(String),
    #[error("grading service error: {0}")]
    Service(String),
    #[error("malformed grading response: {0}")]
    Malformed(String),
    #[error("grading transport error: {0}")]
    Transport(String),
    #[error("grading request timed out: {0}")]
    Timeout(String),
}

impl GradingFailure {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Service(_) | Self::Transport(_) | Self::Timeout(_))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GradingClient {
    client: Client,
    url: String,
    api_key: String,
    max_retries: u32,
    retry_base: Duration,
}

impl GradingClient {
    pub(crate) fn from_settings(settings: &GradingSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(settings.timeout())
            .build()
            .context("Failed to build grading HTTP client")?;

        Ok(Self {
            client,
            url: settings.function_url.trim_end_matches('/').to_string(),
            api_key: settings.function_key.clone(),
            max_retries: settings.max_retries,
            retry_base: Duration::from_millis(settings.retry_base_ms),
        })
    }

    async fn call_once(&self, request: &GradingRequest) -> Result<GradingResponse, GradingFailure> {
        let mut builder = self.client.post(&self.url).json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(transport_failure)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_failure)?;
        let body = match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => value,
            Err(_) => Value::String(String::from_utf8_lossy(&bytes).trim().to_string()),
        };

        interpret_response(status, body)
    }
}

#[async_trait]
impl GradingFunction for GradingClient {
    async fn grade(&self, request: &GradingRequest) -> Result<GradingResponse, GradingFailure> {
        if self.url.is_empty() {
            return Err(GradingFailure::Service("grading function is not configured".to_string()));
        }

        let timer = Instant::now();
        let mut attempt = 0;
        loop {
            match self.call_once(request).await {
                Ok(response) => {
                    tracing::debug!(
                        attempt,
                        elapsed_ms = timer.elapsed().as_millis() as u64,
                        processing_time_ms = response.processing_time_ms,
                        "Grading function responded"
                    );
                    return Ok(response);
                }
                Err(failure) if failure.is_transient() && attempt < self.max_retries => {
                    let delay = backoff_delay(self.retry_base, attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "Grading call failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure),
            }
        }
    }
}

fn transport_failure(err: reqwest::Error) -> GradingFailure {
    if err.is_timeout() {
        GradingFailure::Timeout(err.to_string())
    } else {
        GradingFailure::Transport(err.to_string())
    }
}

/// Maps a raw HTTP exchange onto the grading contract. A body that is not JSON arrives
/// as `Value::String` holding the raw text.
pub(crate) fn interpret_response(
    status: StatusCode,
    body: Value,
) -> Result<GradingResponse, GradingFailure> {
    let error_message = body.get("error").filter(|value| !value.is_null()).map(|value| {
        match value.as_str() {
            Some(text) => text.to_string(),
            None => value.to_string(),
        }
    });

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        let message = match (error_message, body.as_str()) {
            (Some(message), _) => message,
            (None, Some(text)) if !text.is_empty() => text.to_string(),
            _ => status.to_string(),
        };
        return Err(GradingFailure::Unauthorized(message));
    }

    if let Some(message) = error_message {
        if is_permission_message(&message) {
            return Err(GradingFailure::Unauthorized(message));
        }
        return Err(GradingFailure::Service(message));
    }

    if !status.is_success() {
        return Err(GradingFailure::Service(format!("grading function returned {status}")));
    }

    if !body.is_object() {
        return Err(GradingFailure::Malformed("response is not a JSON object".to_string()));
    }

    let response: GradingResponse = serde_json::from_value(body)
        .map_err(|err| GradingFailure::Malformed(err.to_string()))?;

    if !response.score.is_finite() {
        return Err(GradingFailure::Malformed("score is not a finite number".to_string()));
    }

    Ok(response)
}

fn is_permission_message(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    ["unauthorized", "forbidden", "permission", "not allowed", "not authorized"]
        .iter()
        .any(|needle| lowered.contains(needle))
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponential = base.saturating_mul(2_u32.saturating_pow(attempt));
    let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis().max(1) as u64 / 2);
    exponential + Duration::from_millis(jitter_ms)
}
