//! Provider interfaces for the black-box capabilities the turn controller
//! depends on.
//!
//! Each capability is a trait so the controller can be constructed with any
//! implementation (real HTTP adapters in production, scripted mocks in tests).
//! No process-wide singletons: services are built once at startup and shared
//! via `Arc`.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tool call request proposed by the LLM.
///
/// Transient; exists only within one turn. The argument payload is untyped
/// here — validation into typed arguments happens in the tool registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: HashMap<String, serde_json::Value>,
}

/// Response from the completion API.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub finish_reason: String,
}

impl LlmResponse {
    /// Check if the response contains tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Hosted chat-completion API: (messages, tool schemas) -> reply or tool call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages` - List of message objects with `role` and `content`.
    /// * `tools` - Optional list of tool definitions in OpenAI function format.
    ///   When present, tool invocation is permitted automatically.
    async fn chat(
        &self,
        messages: &[serde_json::Value],
        tools: Option<&[serde_json::Value]>,
    ) -> Result<LlmResponse>;
}

/// Speech-to-text: audio bytes -> plain text.
///
/// An empty transcript means no speech was detected; it is not an error.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Text-to-speech: text -> audio byte stream.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Text embedding: text -> fixed-length numeric vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
