use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::endpoints::{ResponsesRequest, ResponsesResponse};
use crate::config::{OpenAiConfig, API_KEY_ENV_VAR};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

/// Anything that turns a prompt into free text. The server only talks to the model
/// through this, which lets tests swap in canned output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ApiConnectionError>;
}

/// Client for the OpenAI Responses API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub async fn create_response(
        &self,
        request: &ResponsesRequest,
    ) -> Result<ResponsesResponse, ApiConnectionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ApiConnectionError::MissingApiKey(API_KEY_ENV_VAR.to_string()))?;

        let url = format!("{}/v1/responses", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ApiConnectionError> {
        let request = ResponsesRequest {
            model: self.config.model.clone(),
            input: prompt.to_string(),
            max_output_tokens: Some(self.config.max_output_tokens),
        };

        let response = self.create_response(&request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                response_id = %response.id,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Model call finished"
            );
        }
        Ok(response.output_text())
    }
}
