//! Conversational turn controller.
//!
//! Converts one normalized user input string into a [`TurnResult`]: retrieve
//! prior context from memory, call the completion API with the tool schemas,
//! validate and dispatch any requested tool, persist the exchange, and render
//! the reply in the session's requested modality.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::memory::VectorMemory;
use crate::providers::base::{CompletionClient, Embedder, Synthesizer};
use crate::tools::registry::ToolRegistry;
use crate::errors::ToolError;

/// System instruction sent on every turn.
pub const SYSTEM_PROMPT: &str = "You are a helpful, concise voice assistant. \
    Only invoke a tool when the user explicitly supplies the required fields \
    for that tool; otherwise respond conversationally.";

/// Fixed reply when the completion API fails outright.
pub const REPLY_UPSTREAM_FAILURE: &str = "Sorry, I'm having trouble responding right now.";

/// Fixed reply when the completion response carries neither usable content
/// nor a recognizable tool request.
pub const REPLY_UNRECOGNIZED: &str = "Sorry, I received a response I couldn't make sense of.";

/// Fixed reply when a malformed or incomplete tool call was blocked.
pub const REPLY_BLOCKED_TOOL: &str =
    "I blocked a malformed tool call. Please spell out all the required details and try again.";

/// Fixed reply when transcription yields no usable text.
pub const REPLY_AUDIO_NOT_UNDERSTOOD: &str = "Could not understand audio.";

/// Fixed reply for unexpected internal failures.
pub const REPLY_INTERNAL_ERROR: &str = "Something went wrong on my end. Please try again.";

/// Requested reply modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Text,
    Audio,
}

impl Default for ResponseMode {
    fn default() -> Self {
        ResponseMode::Audio
    }
}

impl ResponseMode {
    /// Parse a mode string from a client control message.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ResponseMode::Text),
            "audio" => Some(ResponseMode::Audio),
            _ => None,
        }
    }
}

/// The outcome of one turn: reply text, the modality it was rendered in, and
/// synthesized audio when the modality is audio.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub reply: String,
    pub mode: ResponseMode,
    pub audio: Option<Vec<u8>>,
}

/// Orchestrates one conversational turn. All collaborators are injected at
/// construction and shared read-mostly across sessions.
pub struct TurnController {
    completion: Arc<dyn CompletionClient>,
    embedder: Arc<dyn Embedder>,
    synthesizer: Arc<dyn Synthesizer>,
    memory: Arc<VectorMemory>,
    tools: Arc<ToolRegistry>,
    top_k: usize,
}

impl TurnController {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        embedder: Arc<dyn Embedder>,
        synthesizer: Arc<dyn Synthesizer>,
        memory: Arc<VectorMemory>,
        tools: Arc<ToolRegistry>,
        top_k: usize,
    ) -> Self {
        Self {
            completion,
            embedder,
            synthesizer,
            memory,
            tools,
            top_k,
        }
    }

    /// Process one turn.
    ///
    /// Steps run strictly in order: memory retrieval (best effort), prompt
    /// assembly, completion request, response interpretation, tool validation
    /// and dispatch, memory write (best effort), rendering. Memory failures
    /// never abort the turn; completion and tool outcomes always surface as a
    /// user-visible reply string.
    pub async fn process_turn(&self, input_text: &str, mode: ResponseMode) -> TurnResult {
        // 1. Memory retrieval — non-fatal on any failure.
        let past_context = self.retrieve_context(input_text).await;

        // 2. Prompt assembly.
        let effective = effective_input(&past_context, input_text);

        // 3-5. Completion request and interpretation.
        let reply = self.complete_and_dispatch(&effective).await;

        // 6. Memory write — never alters the reply already computed.
        self.remember_exchange(input_text, &reply).await;

        // 7. Rendering.
        self.render(reply, mode).await
    }

    /// Simplified single-turn variant: direct completion only, no memory, no
    /// tool dispatch. Backs the synchronous request/response endpoint.
    pub async fn direct_reply(&self, prompt: &str) -> anyhow::Result<String> {
        let messages = vec![
            serde_json::json!({"role": "system", "content": SYSTEM_PROMPT}),
            serde_json::json!({"role": "user", "content": prompt}),
        ];

        let response = self.completion.chat(&messages, None).await?;
        Ok(response
            .content
            .unwrap_or_else(|| REPLY_UNRECOGNIZED.to_string()))
    }

    /// Embed the input and collect the nearest stored exchanges, newline
    /// joined in similarity-rank order. Any failure degrades to "".
    async fn retrieve_context(&self, input_text: &str) -> String {
        let embedding = match self.embedder.embed(input_text).await {
            Ok(e) => e,
            Err(e) => {
                warn!("Memory retrieval skipped, embedding failed: {}", e);
                return String::new();
            }
        };

        let texts = self.memory.query(&embedding, self.top_k);
        debug!("Retrieved {} prior exchange(s)", texts.len());
        texts.join("\n")
    }

    /// Steps 3-5: call the completion API with tool schemas, then either take
    /// the direct reply, dispatch the requested tool, or fall back.
    async fn complete_and_dispatch(&self, effective_input: &str) -> String {
        let messages = vec![
            serde_json::json!({"role": "system", "content": SYSTEM_PROMPT}),
            serde_json::json!({"role": "user", "content": effective_input}),
        ];
        let definitions = self.tools.definitions();

        let response = match self.completion.chat(&messages, Some(&definitions)).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Completion request failed: {}", e);
                return REPLY_UPSTREAM_FAILURE.to_string();
            }
        };

        if let Some(call) = response.tool_calls.first() {
            return match self.tools.validate(&call.name, &call.arguments) {
                Ok(invocation) => {
                    info!("Dispatching tool call: {}", invocation.tool_name());
                    self.tools.execute(invocation).await
                }
                Err(ToolError::UnknownTool(name)) => {
                    warn!("Completion requested unknown tool '{}'", name);
                    REPLY_UNRECOGNIZED.to_string()
                }
                Err(e) => {
                    warn!("Blocked tool call: {}", e);
                    REPLY_BLOCKED_TOOL.to_string()
                }
            };
        }

        match response.content {
            Some(text) => text,
            None => REPLY_UNRECOGNIZED.to_string(),
        }
    }

    /// Step 6: serialize and store the exchange. Best effort.
    async fn remember_exchange(&self, input_text: &str, reply: &str) {
        let exchange = format!("User: {}\nAI: {}", input_text, reply);

        let embedding = match self.embedder.embed(&exchange).await {
            Ok(e) => e,
            Err(e) => {
                warn!("Memory write skipped, embedding failed: {}", e);
                return;
            }
        };

        let id = Uuid::new_v4().to_string();
        if let Err(e) = self.memory.add(&exchange, embedding, &id) {
            warn!("Memory write failed: {}", e);
        }
    }

    /// Step 7: render the reply in the requested modality. A synthesis
    /// failure degrades to a text-only result; the reply text is always
    /// retained.
    async fn render(&self, reply: String, mode: ResponseMode) -> TurnResult {
        let audio = match mode {
            ResponseMode::Text => None,
            ResponseMode::Audio => match self.synthesizer.synthesize(&reply).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!("Synthesis failed, falling back to text: {}", e);
                    None
                }
            },
        };

        TurnResult { reply, mode, audio }
    }
}

/// Prepend retrieved context to the user input when any exists; otherwise the
/// input passes through unchanged.
fn effective_input(past_context: &str, input_text: &str) -> String {
    if past_context.is_empty() {
        input_text.to_string()
    } else {
        format!(
            "Prior context:\n{}\n\nUser: {}",
            past_context, input_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_input_without_context() {
        assert_eq!(effective_input("", "hello"), "hello");
    }

    #[test]
    fn test_effective_input_with_context() {
        let out = effective_input("User: hi\nAI: hey", "what did I say?");
        assert_eq!(
            out,
            "Prior context:\nUser: hi\nAI: hey\n\nUser: what did I say?"
        );
    }

    #[test]
    fn test_response_mode_parse() {
        assert_eq!(ResponseMode::parse("text"), Some(ResponseMode::Text));
        assert_eq!(ResponseMode::parse("audio"), Some(ResponseMode::Audio));
        assert_eq!(ResponseMode::parse("video"), None);
    }

    #[test]
    fn test_response_mode_default_is_audio() {
        assert_eq!(ResponseMode::default(), ResponseMode::Audio);
    }
}
