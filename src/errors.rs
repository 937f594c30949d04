//! Domain error types for voxbot.
//!
//! Typed errors at module boundaries replace string-encoded errors and
//! enable structured error handling via pattern matching.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Errors from black-box provider operations (completion, transcription,
/// synthesis, embeddings).
///
/// Embedded in `anyhow::Error` so the provider trait signatures
/// (`-> anyhow::Result<...>`) stay uniform while callers can downcast:
/// `e.downcast_ref::<ProviderError>()`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

impl ProviderError {
    /// Map a `reqwest` error onto the provider taxonomy, distinguishing
    /// timeouts from other transport failures.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Tool validation errors
// ---------------------------------------------------------------------------

/// Rejection reasons from tool-call validation.
///
/// Produced by `ToolRegistry::validate` before any side effect runs. Never
/// produced by executors; execution failures are reported as user-facing
/// strings instead (the controller renders them, it does not branch on them).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool '{tool}' is missing required parameter '{param}'")]
    MissingParam { tool: String, param: String },

    #[error("Malformed arguments for tool '{tool}': {reason}")]
    MalformedArguments { tool: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let e = ProviderError::Http("connection refused".into());
        assert_eq!(e.to_string(), "HTTP request failed: connection refused");
    }

    #[test]
    fn test_provider_error_api_status() {
        let e = ProviderError::Api {
            status: 429,
            message: "rate limited".into(),
        };
        assert!(e.to_string().contains("429"));
        assert!(e.to_string().contains("rate limited"));
    }

    #[test]
    fn test_provider_error_downcast() {
        let anyhow_err: anyhow::Error = ProviderError::Timeout(30).into();
        let downcasted = anyhow_err.downcast_ref::<ProviderError>();
        assert!(matches!(downcasted, Some(ProviderError::Timeout(30))));
    }

    #[test]
    fn test_tool_error_missing_param_display() {
        let e = ToolError::MissingParam {
            tool: "send_email".into(),
            param: "subject".into(),
        };
        assert!(e.to_string().contains("send_email"));
        assert!(e.to_string().contains("subject"));
    }

    #[test]
    fn test_tool_error_unknown_tool_display() {
        let e = ToolError::UnknownTool("magic_wand".into());
        assert_eq!(e.to_string(), "Unknown tool: magic_wand");
    }
}
