//! Speech-to-text provider using a Whisper-compatible transcription API.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use super::base::Transcriber;
use crate::config::schema::TranscriptionConfig;
use crate::errors::ProviderError;

/// Transcription provider for any Whisper-compatible HTTP endpoint.
pub struct WhisperTranscriber {
    api_key: String,
    api_url: String,
    model: String,
    timeout_secs: u64,
    client: Client,
}

impl WhisperTranscriber {
    /// Create a new transcription provider.
    ///
    /// If the configured key is empty, the `TRANSCRIPTION_API_KEY` environment
    /// variable is checked at construction time.
    pub fn new(config: &TranscriptionConfig) -> Self {
        let api_key = if config.api_key.is_empty() {
            std::env::var("TRANSCRIPTION_API_KEY").unwrap_or_default()
        } else {
            config.api_key.clone()
        };

        Self {
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        if self.api_key.is_empty() {
            warn!("Transcription API key not configured");
            return Err(ProviderError::Api {
                status: 401,
                message: "transcription API key not configured".into(),
            }
            .into());
        }

        let file_part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("clip.wav")
            .mime_str("application/octet-stream")
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Transcription failed (HTTP {}): {}", status, body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        // An empty transcript is a valid outcome (no speech detected).
        Ok(data
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string())
    }
}
