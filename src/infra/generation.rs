//! Client for the external language-model orchestration service.
//!
//! The backend is a black box: given extracted text plus day/week/platform
//! context it returns generated text. Responses arrive either as a
//! structured object with an `output` field or as a bare JSON string; both
//! shapes are normalized here so callers only ever see plain text.

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::types::Platform;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("generation backend endpoint is not configured")]
    Unconfigured,
    #[error("generation backend request failed: {0}")]
    Transport(String),
    #[error("generation backend returned an unusable response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTask {
    Research,
    QualityControl,
    PlatformPost,
    Rewrite,
    RegenerateContent,
    RegenerateSubcontent,
}

/// Context handed to the backend for one generation call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub task: GenerationTask,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_limit: Option<usize>,
}

impl GenerationRequest {
    pub fn new(task: GenerationTask, text: impl Into<String>) -> Self {
        Self {
            task,
            text: text.into(),
            week: None,
            day: None,
            platform: None,
            word_limit: None,
        }
    }

    pub fn with_calendar_slot(mut self, week: u32, day: &str) -> Self {
        self.week = Some(week);
        self.day = Some(day.to_string());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self.word_limit = Some(platform.word_limit());
        self
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError>;
}

/// HTTP implementation posting JSON to a configured endpoint.
pub struct HttpGenerationBackend {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpGenerationBackend {
    pub fn new(
        endpoint: Option<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
        let endpoint = self.endpoint.as_ref().ok_or(BackendError::Unconfigured)?;

        let result = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                counter!("postweave_backend_failure_total").increment(1);
                return Err(BackendError::Transport(err.to_string()));
            }
        };

        let value: Value = response.json().await.map_err(|err| {
            counter!("postweave_backend_failure_total").increment(1);
            BackendError::MalformedResponse(err.to_string())
        })?;

        normalize_output(&value).ok_or_else(|| {
            counter!("postweave_backend_failure_total").increment(1);
            BackendError::MalformedResponse(format!("unexpected response shape: {value}"))
        })
    }
}

/// Accept both response shapes the backend is known to produce.
pub fn normalize_output(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => match fields.get("output") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        },
        _ => None,
    }
}
