use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::query::QueryResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("server responded {status}: {body}")]
    Server {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Thin client for the server's `/api/query` endpoint.
#[derive(Debug, Clone)]
pub struct RecipeApiClient {
    http: Client,
    base_url: String,
}

impl RecipeApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn query(&self, text: &str) -> Result<QueryResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/query", self.base_url))
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Server { status, body });
        }
        Ok(response.json::<QueryResponse>().await?)
    }
}
