//! Configuration schema for voxbot.
//!
//! All structs use `#[serde(rename_all = "camelCase")]` so that the JSON config
//! file can use camelCase keys while Rust code uses snake_case fields.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// HTTP/WebSocket gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    18990
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider configs
// ---------------------------------------------------------------------------

/// LLM chat completion API configuration (any OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_completion_base")]
    pub api_base: String,
    #[serde(default = "default_completion_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_completion_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_completion_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_completion_base(),
            model: default_completion_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Speech-to-text configuration (Whisper-compatible transcription endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_transcription_url")]
    pub api_url: String,
    #[serde(default = "default_transcription_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_transcription_url() -> String {
    "https://api.groq.com/openai/v1/audio/transcriptions".to_string()
}

fn default_transcription_model() -> String {
    "whisper-large-v3".to_string()
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_transcription_url(),
            model: default_transcription_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Text-to-speech configuration (ElevenLabs-style synthesis endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_synthesis_url")]
    pub api_url: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_synthesis_url() -> String {
    "https://api.elevenlabs.io/v1/text-to-speech".to_string()
}

fn default_voice() -> String {
    "Sarah".to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_synthesis_url(),
            voice: default_voice(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Text embedding configuration (OpenAI-compatible embeddings endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embeddings_url")]
    pub api_url: String,
    #[serde(default = "default_embeddings_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embeddings_url() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

fn default_embeddings_model() -> String {
    "text-embedding-3-small".to_string()
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_embeddings_url(),
            model: default_embeddings_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Vector memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    /// JSONL persistence file. `None` keeps the store purely in-memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Nearest-neighbor count for context retrieval.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Capacity bound; the oldest record is evicted on overflow.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

fn default_top_k() -> usize {
    3
}

fn default_max_records() -> usize {
    10_000
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            top_k: default_top_k(),
            max_records: default_max_records(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tool providers
// ---------------------------------------------------------------------------

/// SMTP configuration for the send_email tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Calendar provider configuration for the schedule_event tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConfig {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_token: String::new(),
            calendar_id: default_calendar_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.gateway.port, 18990);
        assert_eq!(cfg.memory.top_k, 3);
        assert_eq!(cfg.email.smtp_port, 587);
        assert_eq!(cfg.synthesis.voice, "Sarah");
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.completion.max_tokens, 512);
        assert_eq!(cfg.memory.max_records, 10_000);
        assert!(cfg.memory.path.is_none());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{"completion": {"apiKey": "sk-test", "maxTokens": 256}}"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.completion.api_key, "sk-test");
        assert_eq!(cfg.completion.max_tokens, 256);
    }

    #[test]
    fn test_roundtrip() {
        let mut cfg = Config::default();
        cfg.gateway.port = 9001;
        cfg.memory.top_k = 5;
        let json = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gateway.port, 9001);
        assert_eq!(back.memory.top_k, 5);
    }
}
