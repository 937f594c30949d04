//! Tool registry: declares the available tools, validates raw argument
//! payloads into typed invocations, and executes them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use serde_json::Value;
use tracing::{info, warn};

use super::calendar::{normalize_event_date, CalendarEvent, CalendarPort};
use super::email::EmailPort;
use super::schema::{schedule_event_schema, send_email_schema, ToolSchema};
use super::{ScheduleEventArgs, SendEmailArgs, ToolInvocation};
use crate::errors::ToolError;

/// Registry over the closed set of built-in tools.
///
/// Executors are injected so tests can observe side effects without a live
/// SMTP server or calendar API.
pub struct ToolRegistry {
    schemas: Vec<ToolSchema>,
    email: Arc<dyn EmailPort>,
    calendar: Arc<dyn CalendarPort>,
}

impl ToolRegistry {
    pub fn new(email: Arc<dyn EmailPort>, calendar: Arc<dyn CalendarPort>) -> Self {
        Self {
            schemas: vec![send_email_schema(), schedule_event_schema()],
            email,
            calendar,
        }
    }

    /// Tool definitions in the OpenAI function format, for the completion
    /// request.
    pub fn definitions(&self) -> Vec<Value> {
        self.schemas.iter().map(|s| s.to_openai_json()).collect()
    }

    /// Check whether a tool name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.schemas.iter().any(|s| s.name == name)
    }

    /// Validate a raw argument payload against the named tool's schema and
    /// produce a typed invocation.
    ///
    /// Rejects unknown tool names, payloads missing a required parameter, and
    /// payloads whose fields don't deserialize into the tool's argument
    /// struct. Extra fields are not an error. No side effect runs until
    /// validation has passed.
    pub fn validate(
        &self,
        name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<ToolInvocation, ToolError> {
        let schema = self
            .schemas
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        for param in schema.required_params() {
            let present = arguments
                .get(param)
                .map(|v| !v.is_null())
                .unwrap_or(false);
            if !present {
                return Err(ToolError::MissingParam {
                    tool: name.to_string(),
                    param: param.to_string(),
                });
            }
        }

        let payload = Value::Object(
            arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );

        match name {
            "send_email" => serde_json::from_value::<SendEmailArgs>(payload)
                .map(ToolInvocation::SendEmail)
                .map_err(|e| ToolError::MalformedArguments {
                    tool: name.to_string(),
                    reason: e.to_string(),
                }),
            "schedule_event" => serde_json::from_value::<ScheduleEventArgs>(payload)
                .map(ToolInvocation::ScheduleEvent)
                .map_err(|e| ToolError::MalformedArguments {
                    tool: name.to_string(),
                    reason: e.to_string(),
                }),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }

    /// Execute a validated invocation synchronously.
    ///
    /// Always returns a user-facing outcome string: success strings carry no
    /// prefix, failures are prefixed `"Tool failed: "` so the two are
    /// distinguishable without the caller branching on which occurred.
    pub async fn execute(&self, invocation: ToolInvocation) -> String {
        match invocation {
            ToolInvocation::SendEmail(args) => {
                info!("Executing send_email to {}", args.to);
                match self.email.send(&args.to, &args.subject, &args.body).await {
                    Ok(()) => format!("Email sent to {}", args.to),
                    Err(e) => {
                        warn!("send_email failed: {}", e);
                        format!("Tool failed: could not send email: {}", e)
                    }
                }
            }
            ToolInvocation::ScheduleEvent(args) => {
                // Year inference happens here, after validation and before
                // the event is persisted.
                let date = normalize_event_date(&args.date, Local::now().date_naive());
                let event = CalendarEvent {
                    title: args.title.clone(),
                    date: date.clone(),
                    time: args.time.clone(),
                    end_time: args.end_time,
                    location: args.location,
                    description: args.description,
                };
                info!("Executing schedule_event '{}' on {}", args.title, date);
                match self.calendar.create_event(&event).await {
                    Ok(()) => format!(
                        "Event '{}' scheduled for {} at {}",
                        args.title, date, args.time
                    ),
                    Err(e) => {
                        warn!("schedule_event failed: {}", e);
                        format!("Tool failed: could not schedule event: {}", e)
                    }
                }
            }
        }
    }
}
