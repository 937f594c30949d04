//! OpenAI-compatible chat completion client.
//!
//! Talks to any provider that implements the OpenAI chat completions API
//! format (Groq, OpenRouter, OpenAI, vLLM, ...).

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::base::{CompletionClient, LlmResponse, ToolCallRequest};
use crate::config::schema::CompletionConfig;
use crate::errors::ProviderError;

/// Chat completion client for any OpenAI-compatible endpoint.
pub struct OpenAiCompatClient {
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout_secs: u64,
    client: Client,
}

impl OpenAiCompatClient {
    /// Create a new client from configuration.
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn chat(
        &self,
        messages: &[serde_json::Value],
        tools: Option<&[serde_json::Value]>,
    ) -> Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.api_base);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        if let Some(tool_defs) = tools {
            if !tool_defs.is_empty() {
                body["tools"] = serde_json::Value::Array(tool_defs.to_vec());
                body["tool_choice"] = serde_json::json!("auto");
            }
        }

        debug!("chat: api_base={} model={}", self.api_base, self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if !status.is_success() {
            warn!(
                "Completion API returned status {} (base={}): {}",
                status, self.api_base, response_text
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: response_text,
            }
            .into());
        }

        let data: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parse_response(&data))
    }
}

/// Parse an OpenAI-format chat completion response.
///
/// Tool call arguments arrive as a JSON string; an unparseable argument
/// string is preserved under a `"raw"` key so that downstream validation
/// rejects the call instead of silently dropping it.
fn parse_response(data: &serde_json::Value) -> LlmResponse {
    let choice = data
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .cloned()
        .unwrap_or_default();

    let message = choice.get("message").cloned().unwrap_or_default();
    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .unwrap_or("stop")
        .to_string();

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut tool_calls = Vec::new();
    if let Some(tc_array) = message.get("tool_calls").and_then(|v| v.as_array()) {
        for tc in tc_array {
            let id = tc
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            let function = tc.get("function").cloned().unwrap_or_default();
            let name = function
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            let arguments_raw = function
                .get("arguments")
                .cloned()
                .unwrap_or(serde_json::Value::String("{}".to_string()));

            let arguments: HashMap<String, serde_json::Value> =
                if let Some(s) = arguments_raw.as_str() {
                    match serde_json::from_str(s) {
                        Ok(map) => map,
                        Err(_) => {
                            let mut m = HashMap::new();
                            m.insert("raw".to_string(), serde_json::Value::String(s.to_string()));
                            m
                        }
                    }
                } else if let Some(obj) = arguments_raw.as_object() {
                    obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
                } else {
                    HashMap::new()
                };

            tool_calls.push(ToolCallRequest {
                id,
                name,
                arguments,
            });
        }
    }

    LlmResponse {
        content,
        tool_calls,
        finish_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_direct_reply() {
        let data = json!({
            "choices": [{
                "message": {"content": "Hello there."},
                "finish_reason": "stop"
            }]
        });
        let r = parse_response(&data);
        assert_eq!(r.content.as_deref(), Some("Hello there."));
        assert!(r.tool_calls.is_empty());
        assert_eq!(r.finish_reason, "stop");
    }

    #[test]
    fn test_parse_empty_content_is_none() {
        let data = json!({
            "choices": [{
                "message": {"content": "   "},
                "finish_reason": "stop"
            }]
        });
        let r = parse_response(&data);
        assert!(r.content.is_none());
    }

    #[test]
    fn test_parse_tool_call_string_arguments() {
        let data = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {
                            "name": "send_email",
                            "arguments": "{\"to\": \"bob@x.com\", \"subject\": \"Hi\", \"body\": \"Hello\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let r = parse_response(&data);
        assert!(r.content.is_none());
        assert_eq!(r.tool_calls.len(), 1);
        let tc = &r.tool_calls[0];
        assert_eq!(tc.name, "send_email");
        assert_eq!(tc.arguments["to"], "bob@x.com");
    }

    #[test]
    fn test_parse_tool_call_object_arguments() {
        let data = json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "id": "call_2",
                        "function": {
                            "name": "schedule_event",
                            "arguments": {"title": "Standup", "date": "2026-09-01", "time": "09:00"}
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let r = parse_response(&data);
        assert_eq!(r.tool_calls[0].arguments["title"], "Standup");
    }

    #[test]
    fn test_parse_garbled_arguments_kept_under_raw() {
        let data = json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "id": "call_3",
                        "function": {"name": "send_email", "arguments": "{not json"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let r = parse_response(&data);
        assert_eq!(r.tool_calls[0].arguments["raw"], "{not json");
    }

    #[test]
    fn test_parse_no_choices() {
        let r = parse_response(&json!({"choices": []}));
        assert!(r.content.is_none());
        assert!(r.tool_calls.is_empty());
    }
}
