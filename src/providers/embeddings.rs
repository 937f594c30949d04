//! Text embedding provider using an OpenAI-compatible embeddings API.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use super::base::Embedder;
use crate::config::schema::EmbeddingsConfig;
use crate::errors::ProviderError;

/// Embedding provider for any OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    api_key: String,
    api_url: String,
    model: String,
    timeout_secs: u64,
    client: Client,
}

impl OpenAiEmbedder {
    /// Create a new embedding provider.
    pub fn new(config: &EmbeddingsConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Embedding request failed (HTTP {}): {}", status, message);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let embedding = data
            .get("data")
            .and_then(|d| d.as_array())
            .and_then(|d| d.first())
            .and_then(|e| e.get("embedding"))
            .and_then(|e| e.as_array())
            .ok_or_else(|| ProviderError::Parse("no embedding in response".into()))?
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect::<Vec<f32>>();

        if embedding.is_empty() {
            return Err(ProviderError::Parse("empty embedding vector".into()).into());
        }

        Ok(embedding)
    }
}
