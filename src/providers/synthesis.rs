//! Text-to-speech provider using an ElevenLabs-style synthesis API.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use super::base::Synthesizer;
use crate::config::schema::SynthesisConfig;
use crate::errors::ProviderError;

/// Synthesis provider that POSTs text and receives audio bytes.
pub struct ElevenLabsSynthesizer {
    api_key: String,
    api_url: String,
    voice: String,
    timeout_secs: u64,
    client: Client,
}

impl ElevenLabsSynthesizer {
    /// Create a new synthesis provider.
    ///
    /// If the configured key is empty, the `SYNTHESIS_API_KEY` environment
    /// variable is checked at construction time.
    pub fn new(config: &SynthesisConfig) -> Self {
        let api_key = if config.api_key.is_empty() {
            std::env::var("SYNTHESIS_API_KEY").unwrap_or_default()
        } else {
            config.api_key.clone()
        };

        Self {
            api_key,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            voice: config.voice.clone(),
            timeout_secs: config.timeout_secs,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Synthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.api_url, self.voice);

        let body = serde_json::json!({
            "text": text,
            "model_id": "eleven_monolingual_v1",
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Synthesis failed (HTTP {}): {}", status, message);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
