use crate::config::ServiceConfig;
use crate::error::{PipelineError, Result};
use crate::services::{SentimentService, TranslationService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_language: Option<&'a str>,
    credential: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationResponse {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentResponse {
    sentiment_score: f64,
}

/// JSON-over-HTTP client for a cloud language service
#[derive(Clone)]
pub struct CloudLanguageClient {
    client: Client,
    endpoint: String,
    credential: String,
    timeout_secs: u64,
}

impl std::fmt::Debug for CloudLanguageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudLanguageClient")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl CloudLanguageClient {
    /// Create a client for `endpoint`; `translate` and `sentiment` are resolved below it
    pub fn new(
        endpoint: impl Into<String>,
        credential: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let credential = credential.into();
        if credential.trim().is_empty() {
            return Err(PipelineError::Service(
                "language service credential is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                PipelineError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credential,
            timeout_secs,
        })
    }

    /// Endpoint from configuration, credential from the environment variable it names
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            PipelineError::Configuration("service.endpoint is not set".to_string())
        })?;
        let credential = std::env::var(&config.credential_env).map_err(|_| {
            PipelineError::Service(format!(
                "credential variable '{}' is not set",
                config.credential_env
            ))
        })?;
        Self::new(endpoint, credential, config.timeout_secs)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, request: &ServiceRequest<'_>) -> Result<T> {
        let url = format!("{}/{}", self.endpoint, path);
        let response = self
            .client
            .post(&url)
            .header("User-Agent", "attrition-pipeline/0.1")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PipelineError::Service(format!(
                        "request to {} timed out after {} seconds",
                        url, self.timeout_secs
                    ))
                } else if e.is_connect() {
                    PipelineError::Service(format!("Failed to connect to {}: {}", url, e))
                } else {
                    PipelineError::Service(format!("request to {} failed: {}", url, e))
                }
            })?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(PipelineError::Credential(format!(
                "credential rejected by {} ({})",
                url, status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Service(format!(
                "{} returned non-success status {}: {}",
                url,
                status,
                if body.is_empty() {
                    "No response body"
                } else {
                    &body
                }
            )));
        }

        debug!(url = %url, status = %status, "Language service call succeeded");
        response
            .json::<T>()
            .await
            .map_err(|e| PipelineError::Service(format!("malformed response from {}: {}", url, e)))
    }
}

#[async_trait]
impl TranslationService for CloudLanguageClient {
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String> {
        let request = ServiceRequest {
            text,
            source_language: source,
            target_language: Some(target),
            credential: &self.credential,
        };
        let response: TranslationResponse = self.post("translate", &request).await?;
        Ok(response.translated_text)
    }
}

#[async_trait]
impl SentimentService for CloudLanguageClient {
    async fn score(&self, text: &str) -> Result<f64> {
        let request = ServiceRequest {
            text,
            source_language: None,
            target_language: None,
            credential: &self.credential,
        };
        let response: SentimentResponse = self.post("sentiment", &request).await?;

        let score = response.sentiment_score;
        if !(0.0..=1.0).contains(&score) {
            return Err(PipelineError::Service(format!(
                "sentiment score {} is outside [0, 1]",
                score
            )));
        }
        Ok(score)
    }
}
